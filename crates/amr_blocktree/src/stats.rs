//! BuildStats - counts collected while building an engine.

use smallvec::SmallVec;

use crate::tree::Tree;

/// Summary of a finished construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
  /// Nodes in the tree (nNode).
  pub node_count: usize,
  /// Leaves, i.e. data-carrying nodes.
  pub leaf_count: usize,
  /// Blocks in the sample table (nBlock).
  pub block_count: usize,
  /// AMR level 0 nodes.
  pub root_count: usize,
  /// Deepest AMR level present.
  pub max_level: u32,
  /// Whether anchors were located on the rayon pool.
  pub parallel_index: bool,
  /// Leaf count per AMR level, index = level.
  pub leaves_per_level: SmallVec<[usize; 16]>,
}

impl BuildStats {
  /// Collect the tree-derived counts.
  pub fn from_tree(tree: &Tree, block_count: usize, parallel_index: bool) -> Self {
    let max_level = tree.max_level();
    let mut leaves_per_level: SmallVec<[usize; 16]> = SmallVec::new();
    leaves_per_level.resize(max_level as usize + 1, 0);
    for leaf in tree.leaves() {
      leaves_per_level[tree.node(leaf).level as usize] += 1;
    }

    Self {
      node_count: tree.len(),
      leaf_count: leaves_per_level.iter().sum(),
      block_count,
      root_count: tree.roots().len(),
      max_level,
      parallel_index,
      leaves_per_level,
    }
  }

  /// Refined (non-leaf) nodes.
  #[inline]
  pub fn refined_count(&self) -> usize {
    self.node_count - self.leaf_count
  }

  /// Leaves at the finest level present.
  #[inline]
  pub fn finest_leaves(&self) -> usize {
    self.leaves_per_level.last().copied().unwrap_or(0)
  }
}
