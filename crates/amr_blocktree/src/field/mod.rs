//! FieldStore - per-block regular grids of field samples.
//!
//! Samples arrive as a row-major `(totalCells, nVariable)` table, one row per
//! cell in flat cell order (see [`layout`]). The table is kept as-is; the
//! derived [`MEASURE`] column is constant within a block and is stored once
//! per block.

pub mod layout;
pub mod variables;

use glam::DVec3;

pub use layout::CellCoord;
pub use variables::{VarId, VariableIndex, COORDINATES, MEASURE};

use crate::error::{ConfigurationError, ConsistencyError, Result};
use crate::tree::BlockId;

/// Stored sample value.
pub type Sample = f32;

/// Regular per-block field grids plus the derived cell measure.
#[derive(Clone, Debug)]
pub struct FieldStore {
  block_size: [usize; 3],
  block_count: usize,
  variables: VariableIndex,
  rows: Vec<Sample>,
  measure: Vec<f64>,
}

impl FieldStore {
  /// Wrap a sample table for `block_count` blocks of `block_size` cells.
  ///
  /// The measure column reads as NaN until [`FieldStore::with_measure`].
  pub fn new(
    block_size: [usize; 3],
    block_count: usize,
    variables: VariableIndex,
    rows: Vec<Sample>,
  ) -> Result<Self> {
    if block_size.iter().any(|&n| n < 2) {
      return Err(ConfigurationError::InvalidBlockSize(block_size).into());
    }

    let columns = variables.declared_len();
    if rows.len() % columns != 0 {
      return Err(
        ConfigurationError::RaggedSamples {
          len: rows.len(),
          columns,
        }
        .into(),
      );
    }

    let cells_per_block = block_size.iter().product::<usize>();
    let expected_rows = block_count * cells_per_block;
    if rows.len() / columns != expected_rows {
      return Err(
        ConfigurationError::CellCountMismatch {
          rows: rows.len() / columns,
          columns,
          expected_rows,
          blocks: block_count,
        }
        .into(),
      );
    }

    Ok(Self {
      block_size,
      block_count,
      variables,
      rows,
      measure: vec![f64::NAN; block_count],
    })
  }

  /// Consume the store and return it with the per-block cell volume set.
  #[tracing::instrument(skip_all, name = "field::with_measure")]
  pub fn with_measure(mut self, per_block: Vec<f64>) -> Result<Self> {
    if per_block.len() != self.block_count {
      return Err(
        ConfigurationError::CellCountMismatch {
          rows: per_block.len(),
          columns: 1,
          expected_rows: self.block_count,
          blocks: self.block_count,
        }
        .into(),
      );
    }
    self.measure = per_block;
    Ok(self)
  }

  /// `[nI, nJ, nK]`.
  #[inline]
  pub fn block_size(&self) -> [usize; 3] {
    self.block_size
  }

  /// nBlock.
  #[inline]
  pub fn block_count(&self) -> usize {
    self.block_count
  }

  #[inline]
  pub fn cells_per_block(&self) -> usize {
    self.block_size.iter().product()
  }

  /// Total cells over all blocks.
  #[inline]
  pub fn cell_count(&self) -> usize {
    self.block_count * self.cells_per_block()
  }

  #[inline]
  pub fn variables(&self) -> &VariableIndex {
    &self.variables
  }

  /// Value of `var` at cell `(i, j, k, block)`.
  ///
  /// Callers pass in-range indices; out-of-range cells panic like slice
  /// indexing does.
  #[inline]
  pub fn value(&self, var: VarId, i: usize, j: usize, k: usize, block: usize) -> f64 {
    self.value_at(var, CellCoord::new(i, j, k, block))
  }

  #[inline]
  pub fn value_at(&self, var: VarId, cell: CellCoord) -> f64 {
    let columns = self.variables.declared_len();
    if var.index() == columns {
      return self.measure[cell.block];
    }
    self.rows[cell.flatten(self.block_size) * columns + var.index()] as f64
  }

  /// Checked variant of [`FieldStore::value`] for ids coming from outside.
  pub fn checked_var(&self, var: VarId) -> Result<VarId> {
    if self.variables.contains(var) {
      Ok(var)
    } else {
      Err(ConsistencyError::ForeignVariable(var).into())
    }
  }

  /// Cell-center coordinates of a cell.
  #[inline]
  pub fn cell_center(&self, cell: CellCoord) -> DVec3 {
    let [x, y, z] = self.variables.coords();
    DVec3::new(
      self.value_at(x, cell),
      self.value_at(y, cell),
      self.value_at(z, cell),
    )
  }

  /// Cell volume of a block.
  #[inline]
  pub fn measure(&self, block: BlockId) -> f64 {
    self.measure[block.index()]
  }

  /// Raw sample rows of one block: `nI * nJ * nK` rows of
  /// `variables().declared_len()` values, `i` fastest.
  pub fn block_rows(&self, block: BlockId) -> &[Sample] {
    let stride = self.cells_per_block() * self.variables.declared_len();
    let start = block.index() * stride;
    &self.rows[start..start + stride]
  }

  /// The full row-major sample table.
  pub fn rows(&self) -> &[Sample] {
    &self.rows
  }
}
