//! Flat cell addressing.
//!
//! Cells are flattened with `i` fastest, then `j`, `k` and finally the block:
//!
//! ```text
//! flat = i + nI * (j + nJ * (k + nK * block))
//! ```

/// Cell address within the `(i, j, k, block)` space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellCoord {
  pub i: usize,
  pub j: usize,
  pub k: usize,
  pub block: usize,
}

impl CellCoord {
  #[inline]
  pub fn new(i: usize, j: usize, k: usize, block: usize) -> Self {
    Self { i, j, k, block }
  }

  /// Flat index for a block of `dims = [nI, nJ, nK]` cells.
  #[inline]
  pub fn flatten(&self, dims: [usize; 3]) -> usize {
    self.i + dims[0] * (self.j + dims[1] * (self.k + dims[2] * self.block))
  }

  /// Inverse of [`CellCoord::flatten`].
  #[inline]
  pub fn unflatten(flat: usize, dims: [usize; 3]) -> Self {
    let [ni, nj, nk] = dims;
    let i = flat % ni;
    let rest = flat / ni;
    let j = rest % nj;
    let rest = rest / nj;
    let k = rest % nk;
    let block = rest / nk;
    Self { i, j, k, block }
  }

  /// Flat index within its own block.
  #[inline]
  pub fn local(&self, dims: [usize; 3]) -> usize {
    self.i + dims[0] * (self.j + dims[1] * self.k)
  }
}
