//! Analytic datasets for tests, benchmarks and smoke checks.
//!
//! Builds a native tree table (1-based, tree-coordinate encoded) and a sample
//! table exactly as the file parsers would, so the whole construction
//! pipeline runs unchanged.
//!
//! ```ignore
//! let dataset = SyntheticDataset::new(DAabb3::UNIT, [4, 4, 4])
//!   .uniform(2)
//!   .field("rho", |p| p.x + 2.0 * p.y)
//!   .build();
//! ```

use glam::DVec3;

use crate::dataset::Dataset;
use crate::field::{CellCoord, Sample, COORDINATES};
use crate::tree::{DAabb3, NodePlacement, NodeStatus, RawNode, RawTree, CHILDREN_PER_NODE};

type FieldFn = Box<dyn Fn(DVec3) -> f64 + Send + Sync>;
type RefineFn = Box<dyn Fn(&DAabb3, u32) -> bool + Send + Sync>;

/// Builder for analytic [`Dataset`]s.
pub struct SyntheticDataset {
  domain: DAabb3,
  block_size: [usize; 3],
  max_level: u32,
  refine: RefineFn,
  fields: Vec<(String, FieldFn)>,
  reverse_blocks: bool,
  precomputed: bool,
}

impl SyntheticDataset {
  /// Single root block covering `domain`, no refinement, no fields besides
  /// the coordinates.
  pub fn new(domain: DAabb3, block_size: [usize; 3]) -> Self {
    Self {
      domain,
      block_size,
      max_level: 0,
      refine: Box::new(|_, _| false),
      fields: Vec::new(),
      reverse_blocks: false,
      precomputed: false,
    }
  }

  /// Refine every node down to `levels`.
  pub fn uniform(mut self, levels: u32) -> Self {
    self.max_level = levels;
    self.refine = Box::new(|_, _| true);
    self
  }

  /// Refine nodes for which `predicate(bounds, level)` holds, never past
  /// `max_level`.
  pub fn refine_where(
    mut self,
    max_level: u32,
    predicate: impl Fn(&DAabb3, u32) -> bool + Send + Sync + 'static,
  ) -> Self {
    self.max_level = max_level;
    self.refine = Box::new(predicate);
    self
  }

  /// Add a variable sampled from `f` at every cell center.
  pub fn field(mut self, name: &str, f: impl Fn(DVec3) -> f64 + Send + Sync + 'static) -> Self {
    self.fields.push((name.to_string(), Box::new(f)));
    self
  }

  /// Number blocks in reverse leaf order so block ids and leaf order differ.
  pub fn reverse_block_order(mut self, reverse: bool) -> Self {
    self.reverse_blocks = reverse;
    self
  }

  /// Ship physical node boxes directly instead of tree coordinates.
  pub fn precomputed_boxes(mut self, precomputed: bool) -> Self {
    self.precomputed = precomputed;
    self
  }

  pub fn build(self) -> Dataset {
    let (nodes, boxes) = self.build_tree();

    let mut leaves: Vec<usize> = nodes
      .iter()
      .enumerate()
      .filter(|(_, n)| n.status == NodeStatus::Leaf)
      .map(|(i, _)| i)
      .collect();
    if self.reverse_blocks {
      leaves.reverse();
    }

    let mut variables: Vec<String> = COORDINATES.iter().map(|s| s.to_string()).collect();
    variables.extend(self.fields.iter().map(|(name, _)| name.clone()));

    let dims = self.block_size;
    let cells_per_block = dims.iter().product::<usize>();
    let mut samples = Vec::with_capacity(leaves.len() * cells_per_block * variables.len());

    for &leaf in &leaves {
      let bounds = boxes[leaf];
      let spacing = bounds.size() / DVec3::new(dims[0] as f64, dims[1] as f64, dims[2] as f64);
      for local in 0..cells_per_block {
        let cell = CellCoord::unflatten(local, dims);
        let center = bounds.min
          + (DVec3::new(cell.i as f64, cell.j as f64, cell.k as f64) + 0.5) * spacing;
        samples.extend_from_slice(&[center.x as Sample, center.y as Sample, center.z as Sample]);
        samples.extend(self.fields.iter().map(|(_, f)| f(center) as Sample));
      }
    }

    let placement = if self.precomputed {
      NodePlacement::Precomputed(boxes)
    } else {
      NodePlacement::OCTREE
    };

    Dataset {
      block_size: dims,
      domain: self.domain,
      tree: RawTree { nodes, placement },
      variables,
      samples,
    }
  }

  /// Breadth-first native node table plus the physical box of every node.
  fn build_tree(&self) -> (Vec<RawNode>, Vec<DAabb3>) {
    let mut nodes = vec![RawNode::leaf(0, 0, [1, 1, 1])];
    let mut boxes = vec![self.domain];

    let mut cursor = 0;
    while cursor < nodes.len() {
      let level = nodes[cursor].level as u32;
      let bounds = boxes[cursor];
      if level < self.max_level && (self.refine)(&bounds, level) {
        let parent_coord = nodes[cursor].coord;
        let half = bounds.size() * 0.5;
        let mut children = [0i64; CHILDREN_PER_NODE];
        for (octant, slot) in children.iter_mut().enumerate() {
          let offset = [octant & 1, (octant >> 1) & 1, (octant >> 2) & 1];
          let coord = [
            2 * parent_coord[0] - 1 + offset[0] as i64,
            2 * parent_coord[1] - 1 + offset[1] as i64,
            2 * parent_coord[2] - 1 + offset[2] as i64,
          ];
          let min = bounds.min
            + DVec3::new(offset[0] as f64, offset[1] as f64, offset[2] as f64) * half;
          nodes.push(RawNode::leaf(level as i64 + 1, cursor as i64 + 1, coord));
          boxes.push(DAabb3::new(min, min + half));
          *slot = nodes.len() as i64;
        }
        let node = &mut nodes[cursor];
        *node = RawNode::refined(node.level, node.parent, node.coord, children);
      }
      cursor += 1;
    }

    (nodes, boxes)
  }
}
