//! Finite-difference partial derivatives on a block's cell grid.
//!
//! Per axis, at index `n` of `N` cells with spacing `h`:
//! - `n == 0`:     `(f[1] - f[0]) / h`
//! - `n == N - 1`: `(f[N-1] - f[N-2]) / h`
//! - otherwise:    `(f[n+1] - f[n-1]) / (2h)`

use glam::DVec3;

use crate::field::CellCoord;
use crate::index::BlockGrid;

/// One-sided at the block faces, centered inside.
#[inline]
pub fn axis_difference(n: usize, index: usize, h: f64, at: impl Fn(usize) -> f64) -> f64 {
  if index == 0 {
    (at(1) - at(0)) / h
  } else if index == n - 1 {
    (at(n - 1) - at(n - 2)) / h
  } else {
    (at(index + 1) - at(index - 1)) / (2.0 * h)
  }
}

/// `(∂/∂x, ∂/∂y, ∂/∂z)` at `cell`. `sample(i, j, k)` reads the cell's block.
pub fn partials(
  grid: &BlockGrid,
  cell: CellCoord,
  sample: impl Fn(usize, usize, usize) -> f64,
) -> DVec3 {
  let CellCoord { i, j, k, .. } = cell;
  DVec3::new(
    axis_difference(grid.dims[0], i, grid.spacing.x, |n| sample(n, j, k)),
    axis_difference(grid.dims[1], j, grid.spacing.y, |n| sample(i, n, k)),
    axis_difference(grid.dims[2], k, grid.spacing.z, |n| sample(i, j, n)),
  )
}
