//! VariableIndex - variable name to column mapping.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ConfigurationError, Error, Result};

/// Name of the derived per-cell volume column.
pub const MEASURE: &str = "measure";

/// Cell-center coordinate variables every dataset must declare.
pub const COORDINATES: [&str; 3] = ["x", "y", "z"];

/// Resolved variable column.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VarId(pub u32);

impl VarId {
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl fmt::Display for VarId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Name → zero-based column map.
///
/// Declared variables keep their input order; [`MEASURE`] is appended last.
#[derive(Clone, Debug)]
pub struct VariableIndex {
  names: Vec<String>,
  lookup: HashMap<String, VarId>,
  coords: [VarId; 3],
}

impl VariableIndex {
  /// Build from the declared variable names of a sample table.
  pub fn new<S: AsRef<str>>(declared: &[S]) -> Result<Self> {
    let mut names = Vec::with_capacity(declared.len() + 1);
    let mut lookup = HashMap::with_capacity(declared.len() + 1);

    for (column, name) in declared.iter().enumerate() {
      let name = name.as_ref();
      if name == MEASURE {
        return Err(ConfigurationError::ReservedVariable(name.to_string()).into());
      }
      if lookup
        .insert(name.to_string(), VarId(column as u32))
        .is_some()
      {
        return Err(ConfigurationError::DuplicateVariable(name.to_string()).into());
      }
      names.push(name.to_string());
    }

    lookup.insert(MEASURE.to_string(), VarId(names.len() as u32));
    names.push(MEASURE.to_string());

    let mut coords = [VarId(0); 3];
    for (slot, name) in coords.iter_mut().zip(COORDINATES) {
      *slot = *lookup
        .get(name)
        .ok_or(ConfigurationError::MissingCoordinate(name))?;
    }

    Ok(Self {
      names,
      lookup,
      coords,
    })
  }

  /// Resolve a name, failing with [`Error::UnknownVariable`].
  pub fn resolve(&self, name: &str) -> Result<VarId> {
    self
      .get(name)
      .ok_or_else(|| Error::UnknownVariable(name.to_string()))
  }

  #[inline]
  pub fn get(&self, name: &str) -> Option<VarId> {
    self.lookup.get(name).copied()
  }

  /// Resolve the `<prefix>x`, `<prefix>y`, `<prefix>z` components of a
  /// vector quantity, e.g. `b` → `bx`, `by`, `bz`.
  pub fn resolve_vector(&self, prefix: &str) -> Result<[VarId; 3]> {
    Ok([
      self.resolve(&format!("{prefix}x"))?,
      self.resolve(&format!("{prefix}y"))?,
      self.resolve(&format!("{prefix}z"))?,
    ])
  }

  pub fn name(&self, var: VarId) -> Option<&str> {
    self.names.get(var.index()).map(String::as_str)
  }

  /// Total columns including [`MEASURE`].
  #[inline]
  pub fn len(&self) -> usize {
    self.names.len()
  }

  /// Always false: [`MEASURE`] is always present.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  /// Number of columns stored in the sample table (everything but measure).
  #[inline]
  pub fn declared_len(&self) -> usize {
    self.names.len() - 1
  }

  #[inline]
  pub fn measure(&self) -> VarId {
    VarId(self.declared_len() as u32)
  }

  /// Columns of the `x`, `y`, `z` cell-center coordinates.
  #[inline]
  pub fn coords(&self) -> [VarId; 3] {
    self.coords
  }

  #[inline]
  pub fn contains(&self, var: VarId) -> bool {
    var.index() < self.names.len()
  }

  /// `(name, id)` pairs in column order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, VarId)> {
    self
      .names
      .iter()
      .enumerate()
      .map(|(i, name)| (name.as_str(), VarId(i as u32)))
  }
}
