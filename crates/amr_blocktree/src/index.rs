//! BlockIndex - correspondence between tree leaves and data blocks.
//!
//! Each block's anchor cell `(0, 0, 0)` is located in the tree; the leaf
//! found becomes the block's owner. The same pass derives the block's grid
//! spacing from its anchor neighbours and hence its cell volume.

use glam::DVec3;
use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::error::{ConsistencyError, Error, Result};
use crate::field::{CellCoord, FieldStore};
use crate::query::locate;
use crate::tree::{BlockId, DAabb3, NodeId, Tree};

/// Regular cell-center grid of one block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockGrid {
  /// Center of cell `(0, 0, 0)`.
  pub origin: DVec3,
  /// Center-to-center distance along each axis.
  pub spacing: DVec3,
  /// `[nI, nJ, nK]`.
  pub dims: [usize; 3],
}

impl BlockGrid {
  /// Read origin and spacing of `block` from its coordinate columns.
  pub fn from_fields(fields: &FieldStore, block: BlockId) -> Self {
    let b = block.index();
    let origin = fields.cell_center(CellCoord::new(0, 0, 0, b));
    let spacing = DVec3::new(
      fields.cell_center(CellCoord::new(1, 0, 0, b)).x - origin.x,
      fields.cell_center(CellCoord::new(0, 1, 0, b)).y - origin.y,
      fields.cell_center(CellCoord::new(0, 0, 1, b)).z - origin.z,
    );
    Self {
      origin,
      spacing,
      dims: fields.block_size(),
    }
  }

  /// Physical volume of one cell.
  #[inline]
  pub fn cell_volume(&self) -> f64 {
    self.spacing.x * self.spacing.y * self.spacing.z
  }

  #[inline]
  pub fn cell_center(&self, i: usize, j: usize, k: usize) -> DVec3 {
    self.origin + DVec3::new(i as f64, j as f64, k as f64) * self.spacing
  }

  /// Box spanned by the cell faces, half a cell beyond the outer centers.
  pub fn extent(&self) -> DAabb3 {
    let last = DVec3::new(
      (self.dims[0] - 1) as f64,
      (self.dims[1] - 1) as f64,
      (self.dims[2] - 1) as f64,
    );
    let half = self.spacing * 0.5;
    DAabb3::new(
      self.origin - half,
      self.origin + last * self.spacing + half,
    )
  }
}

/// Bidirectional leaf/block mapping plus per-block grids.
#[derive(Clone, Debug)]
pub struct BlockIndex {
  block_to_node: Vec<NodeId>,
  node_to_block: Vec<Option<BlockId>>,
  grids: Vec<BlockGrid>,
}

impl BlockIndex {
  /// Locate every block anchor in `tree`.
  ///
  /// Fails if an anchor matches no leaf, if two blocks land in one leaf, if a
  /// leaf ends up without a block, or (with `check_block_extents`) if a
  /// block's cell faces disagree with its leaf box.
  #[tracing::instrument(skip_all, name = "index::build", fields(blocks = fields.block_count()))]
  pub fn build(tree: &Tree, fields: &FieldStore, config: &EngineConfig) -> Result<Self> {
    let block_count = fields.block_count();

    let locate_block = |b: usize| -> Result<(NodeId, BlockGrid)> {
      let block = BlockId(b as u32);
      let grid = BlockGrid::from_fields(fields, block);
      if !grid.spacing.cmpgt(DVec3::ZERO).all() {
        return Err(
          ConsistencyError::DegenerateSpacing {
            block,
            spacing: grid.spacing.to_array(),
          }
          .into(),
        );
      }
      let node = locate(tree, grid.origin, config.max_descent_depth).map_err(|err| match err {
        Error::OutOfDomain { .. } | Error::Consistency(ConsistencyError::NoRootContains { .. }) => {
          Error::from(ConsistencyError::AnchorNotInTree {
            block,
            anchor: grid.origin.to_array(),
          })
        }
        other => other,
      })?;
      Ok((node, grid))
    };

    let located: Vec<(NodeId, BlockGrid)> = {
      let _span = tracing::info_span!("locate_anchors", parallel = config.parallel_index).entered();
      if config.parallel_index {
        (0..block_count)
          .into_par_iter()
          .map(locate_block)
          .collect::<Result<_>>()?
      } else {
        (0..block_count).map(locate_block).collect::<Result<_>>()?
      }
    };

    let mut block_to_node = Vec::with_capacity(block_count);
    let mut node_to_block: Vec<Option<BlockId>> = vec![None; tree.len()];
    let mut grids = Vec::with_capacity(block_count);

    for (b, (node, grid)) in located.into_iter().enumerate() {
      let block = BlockId(b as u32);
      if let Some(first) = node_to_block[node.index()] {
        return Err(
          ConsistencyError::DuplicateOwner {
            node,
            first,
            second: block,
          }
          .into(),
        );
      }
      if config.check_block_extents {
        check_extent(tree, node, block, &grid)?;
      }
      node_to_block[node.index()] = Some(block);
      block_to_node.push(node);
      grids.push(grid);
    }

    if let Some(node) = tree
      .leaves()
      .find(|leaf| node_to_block[leaf.index()].is_none())
    {
      return Err(ConsistencyError::UnassignedLeaf { node }.into());
    }

    tracing::debug!(blocks = block_count, nodes = tree.len(), "block index built");

    Ok(Self {
      block_to_node,
      node_to_block,
      grids,
    })
  }

  /// nBlock.
  #[inline]
  pub fn len(&self) -> usize {
    self.block_to_node.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.block_to_node.is_empty()
  }

  /// Leaf owning `block`.
  #[inline]
  pub fn node_of(&self, block: BlockId) -> NodeId {
    self.block_to_node[block.index()]
  }

  /// Block of `node`, None for refined nodes.
  #[inline]
  pub fn block_of(&self, node: NodeId) -> Option<BlockId> {
    self.node_to_block.get(node.index()).copied().flatten()
  }

  #[inline]
  pub fn grid(&self, block: BlockId) -> &BlockGrid {
    &self.grids[block.index()]
  }

  pub fn block_to_node(&self) -> &[NodeId] {
    &self.block_to_node
  }

  pub fn node_to_block(&self) -> &[Option<BlockId>] {
    &self.node_to_block
  }

  /// Node-to-block table in the native layout: one entry per node, `-1`
  /// for refined nodes.
  pub fn native_node_to_block(&self) -> Vec<i64> {
    self
      .node_to_block
      .iter()
      .map(|b| b.map_or(-1, |b| b.0 as i64))
      .collect()
  }

  /// Per-block cell volumes in block order.
  pub fn cell_volumes(&self) -> Vec<f64> {
    self.grids.iter().map(BlockGrid::cell_volume).collect()
  }
}

/// The block's cell faces must coincide with its leaf box, up to a small
/// fraction of a cell.
fn check_extent(tree: &Tree, node: NodeId, block: BlockId, grid: &BlockGrid) -> Result<()> {
  let tolerance = 1e-3 * grid.spacing.min_element();
  if grid.extent().max_corner_distance(&tree.node(node).bounds) > tolerance {
    return Err(ConsistencyError::ExtentMismatch { block, node }.into());
  }
  Ok(())
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;
