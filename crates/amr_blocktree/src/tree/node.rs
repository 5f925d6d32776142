//! Node and block identifiers plus the validated per-node record.
//!
//! Ids are 0-based everywhere inside the crate. The simulation's 1-based
//! numbering only appears at the ingestion boundary ([`NodeId::from_native`])
//! and when reporting back ([`NodeId::native`]).

use std::fmt;

use super::DAabb3;

/// Number of children of a refined node.
pub const CHILDREN_PER_NODE: usize = 8;

/// 0-based tree node id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
  /// Translate a 1-based native node number. Returns None for numbers < 1,
  /// which the native encoding uses for "no node".
  #[inline]
  pub fn from_native(native: i64) -> Option<Self> {
    if native < 1 || native > u32::MAX as i64 {
      return None;
    }
    Some(Self((native - 1) as u32))
  }

  /// 1-based native node number.
  #[inline]
  pub fn native(self) -> i64 {
    self.0 as i64 + 1
  }

  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.native())
  }
}

/// 0-based data block id in `[0, nBlock)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BlockId(pub u32);

impl BlockId {
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl fmt::Display for BlockId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Whether a node carries data or has been subdivided.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NodeStatus {
  /// Owns exactly one data block, no children.
  Leaf,
  /// Owns 8 children, no data block.
  Refined,
}

impl NodeStatus {
  /// Decode the child-count flavour of the status flag (0 or 8).
  pub fn from_child_count(count: i64) -> Result<Self, crate::ConfigurationError> {
    match count {
      0 => Ok(NodeStatus::Leaf),
      8 => Ok(NodeStatus::Refined),
      other => Err(crate::ConfigurationError::InvalidChildCount(other)),
    }
  }

  /// 0 for leaves, 8 for refined nodes.
  #[inline]
  pub fn child_count(self) -> usize {
    match self {
      NodeStatus::Leaf => 0,
      NodeStatus::Refined => CHILDREN_PER_NODE,
    }
  }
}

/// Validated tree node.
///
/// Child order follows the octant convention:
/// - bit 0: X offset (0 or 1)
/// - bit 1: Y offset (0 or 1)
/// - bit 2: Z offset (0 or 1)
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
  /// AMR level, 0 = coarsest.
  pub level: u32,
  /// Parent node, None for level-0 nodes.
  pub parent: Option<NodeId>,
  /// Children, present iff refined.
  pub children: Option<[NodeId; CHILDREN_PER_NODE]>,
  /// Position within the domain, normalized to `[0, 1]^3`.
  pub normalized: DAabb3,
  /// Physical bounding box.
  pub bounds: DAabb3,
}

impl Node {
  #[inline]
  pub fn status(&self) -> NodeStatus {
    if self.children.is_some() {
      NodeStatus::Refined
    } else {
      NodeStatus::Leaf
    }
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }

  /// 0 or 8.
  #[inline]
  pub fn child_count(&self) -> usize {
    self.status().child_count()
  }
}
