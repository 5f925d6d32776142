use super::*;
use crate::dataset::Dataset;
use crate::field::VariableIndex;
use crate::synthetic::SyntheticDataset;
use crate::tree::build_geometry;

fn sequential() -> EngineConfig {
  EngineConfig {
    parallel_index: false,
    ..EngineConfig::default()
  }
}

/// Unit cube refined once: 8 leaves of 4x4x4 cells.
fn one_level() -> Dataset {
  SyntheticDataset::new(DAabb3::UNIT, [4, 4, 4])
    .uniform(1)
    .field("rho", |p| p.x)
    .build()
}

fn parts(dataset: &Dataset, blocks: usize) -> (Tree, FieldStore) {
  let tree = build_geometry(&dataset.tree, dataset.domain, &EngineConfig::default())
    .expect("synthetic tree is valid");
  let variables = VariableIndex::new(&dataset.variables).expect("valid variables");
  let columns = dataset.variables.len();
  let rows = dataset.samples[..blocks * dataset.cells_per_block() * columns].to_vec();
  let fields =
    FieldStore::new(dataset.block_size, blocks, variables, rows).expect("consistent samples");
  (tree, fields)
}

fn build(dataset: &Dataset, config: &EngineConfig) -> Result<BlockIndex> {
  let (tree, fields) = parts(dataset, dataset.block_count());
  BlockIndex::build(&tree, &fields, config)
}

/// Apply `f` to coordinate column `axis` of every cell of `block`.
fn edit_block(dataset: &mut Dataset, block: usize, axis: usize, f: impl Fn(usize, f32) -> f32) {
  let columns = dataset.variables.len();
  let cells = dataset.cells_per_block();
  for cell in 0..cells {
    let at = (block * cells + cell) * columns + axis;
    dataset.samples[at] = f(cell, dataset.samples[at]);
  }
}

fn consistency_err(result: Result<BlockIndex>) -> ConsistencyError {
  match result {
    Err(Error::Consistency(err)) => err,
    Err(other) => panic!("expected consistency error, got {other}"),
    Ok(_) => panic!("expected consistency error, got an index"),
  }
}

// =============================================================================
// Correspondence
// =============================================================================

#[test]
fn test_every_block_owns_one_leaf() {
  let dataset = one_level();
  let (tree, fields) = parts(&dataset, 8);
  let index = BlockIndex::build(&tree, &fields, &sequential()).expect("consistent dataset");

  assert_eq!(index.len(), 8);
  for b in 0..8 {
    let block = BlockId(b);
    let node = index.node_of(block);
    assert!(tree.node(node).is_leaf(), "block {block} owns refined node {node}");
    assert_eq!(index.block_of(node), Some(block));
    assert!(
      tree.node(node).bounds.contains_point(index.grid(block).origin),
      "anchor of block {block} outside its leaf"
    );
  }
  assert_eq!(index.block_of(NodeId(0)), None, "root is refined");
}

#[test]
fn test_block_order_independent_of_leaf_order() {
  let dataset = SyntheticDataset::new(DAabb3::UNIT, [4, 4, 4])
    .uniform(1)
    .reverse_block_order(true)
    .build();
  let index = build(&dataset, &sequential()).expect("consistent dataset");

  assert_eq!(index.node_of(BlockId(0)), NodeId(8));
  assert_eq!(index.node_of(BlockId(7)), NodeId(1));
}

#[test]
fn test_parallel_matches_sequential() {
  let dataset = SyntheticDataset::new(DAabb3::UNIT, [4, 4, 4])
    .refine_where(3, |bounds, _| bounds.center().x < 0.5)
    .reverse_block_order(true)
    .build();

  let parallel = build(&dataset, &EngineConfig::default()).expect("parallel build");
  let serial = build(&dataset, &sequential()).expect("sequential build");
  assert_eq!(parallel.block_to_node(), serial.block_to_node());
  assert_eq!(parallel.node_to_block(), serial.node_to_block());
}

#[test]
fn test_native_node_to_block_table() {
  let index = build(&one_level(), &sequential()).expect("consistent dataset");
  let table = index.native_node_to_block();
  assert_eq!(table.len(), 9);
  assert_eq!(table[0], -1, "refined root has no block");
  assert_eq!(&table[1..], &[0, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_grid_and_cell_volume() {
  let index = build(&one_level(), &sequential()).expect("consistent dataset");

  let grid = index.grid(BlockId(7));
  assert_eq!(grid.origin, DVec3::splat(0.5625));
  assert_eq!(grid.spacing, DVec3::splat(0.125));
  assert_eq!(grid.extent(), DAabb3::new(DVec3::splat(0.5), DVec3::ONE));
  assert_eq!(index.cell_volumes(), vec![1.0 / 512.0; 8]);
}

// =============================================================================
// Tree/data mismatches
// =============================================================================

#[test]
fn test_anchor_outside_domain() {
  let mut dataset = one_level();
  edit_block(&mut dataset, 2, 0, |_, x| x + 10.0);

  let err = consistency_err(build(&dataset, &sequential()));
  assert!(
    matches!(err, ConsistencyError::AnchorNotInTree { block: BlockId(2), .. }),
    "unexpected error: {err}"
  );
}

#[test]
fn test_two_blocks_in_one_leaf() {
  let mut dataset = one_level();
  let columns = dataset.variables.len();
  let stride = dataset.cells_per_block() * columns;
  let (first, rest) = dataset.samples.split_at_mut(stride);
  rest[..stride].copy_from_slice(first);

  let err = consistency_err(build(&dataset, &sequential()));
  assert!(matches!(
    err,
    ConsistencyError::DuplicateOwner {
      node: NodeId(1),
      first: BlockId(0),
      second: BlockId(1),
    }
  ));
}

#[test]
fn test_degenerate_spacing() {
  let mut dataset = one_level();
  edit_block(&mut dataset, 0, 1, |_, _| 0.25);

  let err = consistency_err(build(&dataset, &sequential()));
  assert!(matches!(
    err,
    ConsistencyError::DegenerateSpacing { block: BlockId(0), .. }
  ));
}

#[test]
fn test_block_extent_mismatch() {
  let mut dataset = one_level();
  // Same anchor, half the spacing along x
  edit_block(&mut dataset, 0, 0, |cell, _| {
    0.0625 + (cell % 4) as f32 * 0.0625
  });

  let err = consistency_err(build(&dataset, &sequential()));
  assert!(matches!(
    err,
    ConsistencyError::ExtentMismatch {
      block: BlockId(0),
      node: NodeId(1),
    }
  ));

  let unchecked = EngineConfig {
    check_block_extents: false,
    ..sequential()
  };
  assert!(build(&dataset, &unchecked).is_ok());
}

#[test]
fn test_leaf_without_block() {
  let dataset = one_level();
  let (tree, fields) = parts(&dataset, 7);

  let err = consistency_err(BlockIndex::build(&tree, &fields, &sequential()));
  assert!(matches!(
    err,
    ConsistencyError::UnassignedLeaf { node: NodeId(8) }
  ));
}
