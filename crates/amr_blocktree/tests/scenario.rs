//! End-to-end checks on a hand-built single-block dataset.

use amr_blocktree::{
  AmrEngine, CellCoord, DAabb3, Dataset, EngineConfig, Error, NodeId, NodePlacement, RawNode,
  RawTree, Sample,
};
use glam::DVec3;

/// One 2x2x2 block over `[0, 1]^3` with `rho` = 0 at `i = 0` and 1 at `i = 1`.
fn single_block() -> Dataset {
  let mut samples = Vec::new();
  for flat in 0..8 {
    let cell = CellCoord::unflatten(flat, [2, 2, 2]);
    let center = |n: usize| 0.25 + 0.5 * n as Sample;
    samples.extend_from_slice(&[center(cell.i), center(cell.j), center(cell.k), cell.i as Sample]);
  }

  Dataset {
    block_size: [2, 2, 2],
    domain: DAabb3::UNIT,
    tree: RawTree {
      nodes: vec![RawNode::leaf(0, 0, [1, 1, 1])],
      placement: NodePlacement::OCTREE,
    },
    variables: ["x", "y", "z", "rho"].map(String::from).to_vec(),
    samples,
  }
}

fn engine() -> AmrEngine {
  AmrEngine::build(single_block(), &EngineConfig::default()).expect("single block is consistent")
}

#[test]
fn test_midplane_is_mean_of_neighbours() {
  let engine = engine();
  for y in [0.0, 0.1, 0.25, 0.5, 0.77, 1.0] {
    for z in [0.0, 0.3, 0.75, 1.0] {
      let rho = engine
        .interpolate(DVec3::new(0.5, y, z), "rho")
        .expect("point inside domain");
      assert!((rho - 0.5).abs() < 1e-12, "rho({y}, {z}) = {rho}");
    }
  }
}

#[test]
fn test_grid_points_are_exact() {
  let engine = engine();
  assert_eq!(engine.interpolate(DVec3::splat(0.25), "rho").ok(), Some(0.0));
  assert_eq!(
    engine.interpolate(DVec3::new(0.75, 0.25, 0.75), "rho").ok(),
    Some(1.0)
  );
}

#[test]
fn test_outside_cell_centers_holds_boundary_value() {
  let engine = engine();
  assert_eq!(engine.interpolate(DVec3::new(0.1, 0.5, 0.5), "rho").ok(), Some(0.0));
  assert_eq!(engine.interpolate(DVec3::new(1.0, 0.5, 0.5), "rho").ok(), Some(1.0));
}

#[test]
fn test_out_of_domain() {
  let engine = engine();
  let err = engine.interpolate(DVec3::splat(2.0), "rho").unwrap_err();
  assert!(matches!(err, Error::OutOfDomain { .. }), "unexpected error: {err}");
}

#[test]
fn test_unknown_variable() {
  let engine = engine();
  let err = engine.interpolate(DVec3::splat(0.5), "foo").unwrap_err();
  assert!(matches!(err, Error::UnknownVariable(ref name) if name == "foo"));
}

#[test]
fn test_derivative_one_sided_on_two_cells() {
  let engine = engine();
  for flat in 0..8 {
    let d = engine.derivative(flat, "rho").expect("valid cell");
    assert_eq!(d, DVec3::new(2.0, 0.0, 0.0), "gradient at {flat}");
  }
}

#[test]
fn test_single_leaf_owns_block() {
  let engine = engine();
  assert_eq!(engine.locate(DVec3::splat(0.5)).ok(), Some(NodeId(0)));
  assert_eq!(engine.block_index().native_node_to_block(), vec![0]);
  assert_eq!(engine.stats().max_level, 0);
  assert_eq!(engine.total_measure(), 1.0);
}
