//! EngineConfig - construction and query tunables.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigurationError, Result};

/// Configuration for engine construction and queries.
///
/// Every field has a default, so a TOML file only needs to name the values it
/// overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
  /// Hard cap on tree descent steps during point location. A malformed tree
  /// that would descend forever reports an error once this is reached.
  pub max_descent_depth: u32,

  /// Reject tree-coordinate encodings whose domain is not a cube.
  pub require_cubic_domain: bool,

  /// Relative slack when comparing axis ranges for the cubic check.
  pub cubic_tolerance: f64,

  /// Locate block anchors on the rayon pool while building the block index.
  pub parallel_index: bool,

  /// Fractional cell offsets closer than this to an integer are treated as
  /// exact grid coordinates during interpolation.
  pub grid_snap_tolerance: f64,

  /// After indexing, check that every block's cell faces coincide with the
  /// box of the leaf it was assigned to.
  pub check_block_extents: bool,
}

impl EngineConfig {
  /// Parse a TOML document.
  pub fn from_toml_str(content: &str) -> Result<Self> {
    let config: EngineConfig = toml::from_str(content).map_err(ConfigurationError::from)?;
    config.validate()?;
    Ok(config)
  }

  /// Load configuration from a TOML file.
  pub fn load(path: &Path) -> Result<Self> {
    let content =
      std::fs::read_to_string(path).map_err(|source| ConfigurationError::ConfigIo {
        path: path.to_path_buf(),
        source,
      })?;
    Self::from_toml_str(&content)
  }

  /// Reject values no engine can be built with.
  pub fn validate(&self) -> Result<()> {
    if self.max_descent_depth == 0 {
      return Err(
        ConfigurationError::InvalidConfig("max_descent_depth must be at least 1".into()).into(),
      );
    }
    if !(self.cubic_tolerance >= 0.0) {
      return Err(
        ConfigurationError::InvalidConfig(format!(
          "cubic_tolerance must be non-negative, got {}",
          self.cubic_tolerance
        ))
        .into(),
      );
    }
    if !(self.grid_snap_tolerance >= 0.0 && self.grid_snap_tolerance < 0.5) {
      return Err(
        ConfigurationError::InvalidConfig(format!(
          "grid_snap_tolerance must be in [0, 0.5), got {}",
          self.grid_snap_tolerance
        ))
        .into(),
      );
    }
    Ok(())
  }
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_descent_depth: 64,
      require_cubic_domain: true,
      cubic_tolerance: 1e-9,
      parallel_index: true,
      grid_snap_tolerance: 1e-9,
      check_block_extents: true,
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
