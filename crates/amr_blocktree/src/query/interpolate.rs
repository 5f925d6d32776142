//! Trilinear interpolation within one block's cell-center grid.
//!
//! Corner layout of the 8-sample stencil:
//! ```text
//! 0: (lo,lo,lo)  4: (lo,lo,hi)
//! 1: (hi,lo,lo)  5: (hi,lo,hi)
//! 2: (lo,hi,lo)  6: (lo,hi,hi)
//! 3: (hi,hi,lo)  7: (hi,hi,hi)
//! ```
//!
//! Points between the outermost cell centers and the block face have no
//! second corner inside the block. Along such an axis both corners collapse
//! onto the boundary cell, i.e. the value is held constant (nearest
//! neighbour) along that axis only.

use glam::DVec3;

use crate::index::BlockGrid;

/// Corner pair and blend weight along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisStencil {
  pub lo: usize,
  pub hi: usize,
  /// Weight of `hi`, in `[0, 1)`.
  pub t: f64,
}

impl AxisStencil {
  /// True when the axis degraded to a single boundary cell.
  #[inline]
  pub fn is_clamped(&self) -> bool {
    self.lo == self.hi
  }
}

/// Stencil for fractional cell coordinate `frac` on an axis of `n` cells.
///
/// Offsets within `snap` of an integer are treated as that integer so that
/// grid-point queries hit the stored sample exactly.
#[inline]
pub fn axis_stencil(frac: f64, n: usize, snap: f64) -> AxisStencil {
  let nearest = frac.round();
  let frac = if (frac - nearest).abs() <= snap {
    nearest
  } else {
    frac
  };

  let lower = frac.floor();
  let last = n - 1;
  if lower < 0.0 {
    return AxisStencil { lo: 0, hi: 0, t: 0.0 };
  }
  if lower >= last as f64 {
    return AxisStencil {
      lo: last,
      hi: last,
      t: 0.0,
    };
  }

  let lo = lower as usize;
  let t = frac - lower;
  if t == 0.0 {
    AxisStencil { lo, hi: lo, t }
  } else {
    AxisStencil { lo, hi: lo + 1, t }
  }
}

/// Stencils for all three axes of `point` in `grid`.
///
/// `stored(axis, n)` is the recorded coordinate of cell `n` along `axis`.
/// A point whose coordinate equals the recorded one of the nearest cell is
/// taken to lie exactly on that cell, whatever rounding the stored precision
/// introduced into `origin` and `spacing`.
#[inline]
pub fn stencils(
  grid: &BlockGrid,
  point: DVec3,
  snap: f64,
  stored: impl Fn(usize, usize) -> f64,
) -> [AxisStencil; 3] {
  let frac = (point - grid.origin) / grid.spacing;
  let along = |axis: usize| {
    let n = grid.dims[axis];
    let nearest = frac[axis].round();
    let on_grid = nearest >= 0.0
      && nearest <= (n - 1) as f64
      && stored(axis, nearest as usize) == point[axis];
    let frac = if on_grid { nearest } else { frac[axis] };
    axis_stencil(frac, n, snap)
  };
  [along(0), along(1), along(2)]
}

/// Blend the 8 stencil corners. `sample(i, j, k)` reads the block.
pub fn trilinear(stencil: &[AxisStencil; 3], sample: impl Fn(usize, usize, usize) -> f64) -> f64 {
  let [sx, sy, sz] = stencil;

  // Exact grid point
  if sx.is_clamped() && sy.is_clamped() && sz.is_clamped() {
    return sample(sx.lo, sy.lo, sz.lo);
  }

  let c000 = sample(sx.lo, sy.lo, sz.lo);
  let c100 = sample(sx.hi, sy.lo, sz.lo);
  let c010 = sample(sx.lo, sy.hi, sz.lo);
  let c110 = sample(sx.hi, sy.hi, sz.lo);
  let c001 = sample(sx.lo, sy.lo, sz.hi);
  let c101 = sample(sx.hi, sy.lo, sz.hi);
  let c011 = sample(sx.lo, sy.hi, sz.hi);
  let c111 = sample(sx.hi, sy.hi, sz.hi);

  let c00 = lerp(c000, c100, sx.t);
  let c10 = lerp(c010, c110, sx.t);
  let c01 = lerp(c001, c101, sx.t);
  let c11 = lerp(c011, c111, sx.t);

  let c0 = lerp(c00, c10, sy.t);
  let c1 = lerp(c01, c11, sy.t);

  lerp(c0, c1, sz.t)
}

#[inline(always)]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
  if t == 0.0 {
    a
  } else {
    a * (1.0 - t) + b * t
  }
}

#[cfg(test)]
#[path = "interpolate_test.rs"]
mod interpolate_test;
