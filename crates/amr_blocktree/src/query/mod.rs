//! SpatialQuery - read-only point location, interpolation and derivatives.
//!
//! # Module Structure
//!
//! - [`locate`]: tree descent from the level-0 nodes to a leaf
//! - [`interpolate`]: per-axis stencils and the trilinear blend
//! - [`derivative`]: one-sided / centered finite differences
//!
//! [`SpatialQuery`] ties them to a tree, its block index and the field store.
//! It only borrows, so any number of queries may run concurrently.

pub mod derivative;
pub mod interpolate;
pub mod locate;

use glam::DVec3;

pub use locate::locate;

use crate::config::EngineConfig;
use crate::error::{ConsistencyError, Error, Result};
use crate::field::{CellCoord, FieldStore, VarId};
use crate::index::BlockIndex;
use crate::tree::{BlockId, NodeId, Tree};

/// Borrowed view over the immutable engine state.
#[derive(Clone, Copy, Debug)]
pub struct SpatialQuery<'a> {
  tree: &'a Tree,
  index: &'a BlockIndex,
  fields: &'a FieldStore,
  config: &'a EngineConfig,
}

impl<'a> SpatialQuery<'a> {
  pub fn new(
    tree: &'a Tree,
    index: &'a BlockIndex,
    fields: &'a FieldStore,
    config: &'a EngineConfig,
  ) -> Self {
    Self {
      tree,
      index,
      fields,
      config,
    }
  }

  /// Leaf containing `point`.
  #[inline]
  pub fn locate(&self, point: DVec3) -> Result<NodeId> {
    locate(self.tree, point, self.config.max_descent_depth)
  }

  /// Block whose leaf contains `point`.
  pub fn locate_block(&self, point: DVec3) -> Result<BlockId> {
    let node = self.locate(point)?;
    self
      .index
      .block_of(node)
      .ok_or_else(|| ConsistencyError::UnassignedLeaf { node }.into())
  }

  /// Trilinear estimate of `var` at `point`.
  pub fn interpolate(&self, point: DVec3, var: VarId) -> Result<f64> {
    let block = self.locate_block(point)?;
    self.interpolate_in(block, point, var)
  }

  /// Interpolate inside a known block, skipping point location.
  ///
  /// Points outside the block are clamped onto its boundary cells.
  pub fn interpolate_in(&self, block: BlockId, point: DVec3, var: VarId) -> Result<f64> {
    let var = self.fields.checked_var(var)?;
    if block.index() >= self.index.len() {
      return Err(Error::BlockOutOfRange {
        block,
        blocks: self.index.len(),
      });
    }

    let grid = self.index.grid(block);
    let coords = self.fields.variables().coords();
    let b = block.index();
    let stencil = interpolate::stencils(
      grid,
      point,
      self.config.grid_snap_tolerance,
      |axis, n| {
        let mut at = [0; 3];
        at[axis] = n;
        self.fields.value(coords[axis], at[0], at[1], at[2], b)
      },
    );
    Ok(interpolate::trilinear(&stencil, |i, j, k| {
      self.fields.value(var, i, j, k, b)
    }))
  }

  /// Spatial gradient of `var` at the cell with flat index `flat`.
  pub fn derivative(&self, flat: usize, var: VarId) -> Result<DVec3> {
    let var = self.fields.checked_var(var)?;
    let cell = self.decode(flat)?;
    let grid = self.index.grid(BlockId(cell.block as u32));
    Ok(derivative::partials(grid, cell, |i, j, k| {
      self.fields.value(var, i, j, k, cell.block)
    }))
  }

  /// Split a flat cell index and confirm it re-encodes to itself.
  pub fn decode(&self, flat: usize) -> Result<CellCoord> {
    let total = self.fields.cell_count();
    if flat >= total {
      return Err(Error::CellIndexOutOfRange { index: flat, total });
    }

    let dims = self.fields.block_size();
    let cell = CellCoord::unflatten(flat, dims);
    let reencoded = cell.flatten(dims);
    if reencoded != flat {
      return Err(
        ConsistencyError::FlatIndexMismatch {
          index: flat,
          i: cell.i,
          j: cell.j,
          k: cell.k,
          block: cell.block,
          reencoded,
        }
        .into(),
      );
    }
    Ok(cell)
  }
}
