//! Raw tree encoding as handed over by the file parsers.
//!
//! Everything here uses the simulation's native conventions: node numbers are
//! 1-based and a parent number below 1 means "no parent". [`super::build_geometry`]
//! is the only consumer and translates to 0-based [`super::NodeId`]s.

use super::{DAabb3, NodeStatus, CHILDREN_PER_NODE};

/// One node of the native tree table.
#[derive(Clone, Debug, PartialEq)]
pub struct RawNode {
  /// Leaf (data-carrying) or refined.
  pub status: NodeStatus,
  /// AMR level, 0 = coarsest.
  pub level: i64,
  /// 1-based parent number, < 1 for level-0 nodes.
  pub parent: i64,
  /// 1-based child numbers in octant order. Ignored for leaves.
  pub children: [i64; CHILDREN_PER_NODE],
  /// 1-based integer tree coordinate at this node's level.
  pub coord: [i64; 3],
}

impl RawNode {
  /// Leaf node with the given level, parent and tree coordinate.
  pub fn leaf(level: i64, parent: i64, coord: [i64; 3]) -> Self {
    Self {
      status: NodeStatus::Leaf,
      level,
      parent,
      children: [0; CHILDREN_PER_NODE],
      coord,
    }
  }

  /// Refined node owning `children`.
  pub fn refined(
    level: i64,
    parent: i64,
    coord: [i64; 3],
    children: [i64; CHILDREN_PER_NODE],
  ) -> Self {
    Self {
      status: NodeStatus::Refined,
      level,
      parent,
      children,
      coord,
    }
  }
}

/// How physical node boxes are obtained.
#[derive(Clone, Debug, PartialEq)]
pub enum NodePlacement {
  /// Boxes derive from each node's integer `coord`, the refinement ratio and
  /// the number of root blocks per axis.
  TreeCoordinates {
    ratio: [i64; 3],
    root_count: [i64; 3],
  },
  /// Physical boxes supplied directly, one per node, in node order.
  Precomputed(Vec<DAabb3>),
}

impl NodePlacement {
  /// Binary octree with a single root block.
  pub const OCTREE: Self = NodePlacement::TreeCoordinates {
    ratio: [2, 2, 2],
    root_count: [1, 1, 1],
  };
}

/// Native tree table.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTree {
  pub nodes: Vec<RawNode>,
  pub placement: NodePlacement,
}

impl RawTree {
  #[inline]
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Number of data-carrying nodes. Equals the expected block count.
  pub fn leaf_count(&self) -> usize {
    self
      .nodes
      .iter()
      .filter(|n| n.status == NodeStatus::Leaf)
      .count()
  }
}
