//! Block tree: the octree recording how the domain was refined.
//!
//! # Module Structure
//!
//! - [`bounds`]: `DAabb3` - closed double-precision boxes
//! - [`node`]: `NodeId`, `BlockId`, `Node` - validated node records
//! - [`raw`]: `RawTree` - native 1-based encoding from the parsers
//! - [`geometry`]: `build_geometry` - raw encoding to `Tree`

pub mod bounds;
pub mod geometry;
pub mod node;
pub mod raw;

use smallvec::SmallVec;

pub use bounds::DAabb3;
pub use geometry::{build_geometry, max_index};
pub use node::{BlockId, Node, NodeId, NodeStatus, CHILDREN_PER_NODE};
pub use raw::{NodePlacement, RawNode, RawTree};

/// Immutable tree with per-node boxes.
///
/// Built once by [`build_geometry`]. Node order matches the native table, so
/// `NodeId(i)` is native node `i + 1`.
#[derive(Clone, Debug)]
pub struct Tree {
  domain: DAabb3,
  nodes: Vec<Node>,
  roots: SmallVec<[NodeId; 8]>,
}

impl Tree {
  pub(crate) fn from_parts(domain: DAabb3, nodes: Vec<Node>, roots: SmallVec<[NodeId; 8]>) -> Self {
    Self {
      domain,
      nodes,
      roots,
    }
  }

  /// Global simulation domain.
  #[inline]
  pub fn domain(&self) -> &DAabb3 {
    &self.domain
  }

  /// Number of nodes (nNode).
  #[inline]
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  #[inline]
  pub fn node(&self, id: NodeId) -> &Node {
    &self.nodes[id.index()]
  }

  #[inline]
  pub fn get(&self, id: NodeId) -> Option<&Node> {
    self.nodes.get(id.index())
  }

  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  /// AMR level 0 nodes in ascending id order. Point location scans them in
  /// this order and takes the first match.
  #[inline]
  pub fn roots(&self) -> &[NodeId] {
    &self.roots
  }

  /// Iterate over `(id, node)` pairs.
  pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
    self
      .nodes
      .iter()
      .enumerate()
      .map(|(i, node)| (NodeId(i as u32), node))
  }

  /// Iterate over leaf ids.
  pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
    self
      .iter()
      .filter(|(_, node)| node.is_leaf())
      .map(|(id, _)| id)
  }

  pub fn leaf_count(&self) -> usize {
    self.nodes.iter().filter(|n| n.is_leaf()).count()
  }

  /// Deepest AMR level present.
  pub fn max_level(&self) -> u32 {
    self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
  }

  /// Physical boxes in node order, for export.
  pub fn node_bounds(&self) -> impl Iterator<Item = &DAabb3> {
    self.nodes.iter().map(|n| &n.bounds)
  }
}
