//! Dataset - everything the file parsers hand over for one snapshot.

use crate::field::Sample;
use crate::tree::{DAabb3, RawTree};

/// In-memory simulation snapshot, prior to indexing.
///
/// The block count is the tree's leaf count; `samples` must hold exactly
/// `leaves * nI * nJ * nK` rows of `variables.len()` values, in flat cell
/// order (`i` fastest, then `j`, `k`, block).
#[derive(Clone, Debug)]
pub struct Dataset {
  /// Cells per block along each axis, `[nI, nJ, nK]`.
  pub block_size: [usize; 3],
  /// Global domain bounds.
  pub domain: DAabb3,
  /// Native tree table.
  pub tree: RawTree,
  /// Declared variable names in column order. Must include `x`, `y`, `z`.
  pub variables: Vec<String>,
  /// Row-major `(totalCells, nVariable)` sample table.
  pub samples: Vec<Sample>,
}

impl Dataset {
  /// Block count implied by the tree.
  pub fn block_count(&self) -> usize {
    self.tree.leaf_count()
  }

  pub fn cells_per_block(&self) -> usize {
    self.block_size.iter().product()
  }
}
