use super::*;
use crate::error::{ConfigurationError, ConsistencyError};
use crate::synthetic::SyntheticDataset;
use crate::tree::DAabb3;

/// f32 storage limits how closely analytic fields are reproduced.
const EPS: f64 = 1e-5;

/// Unit cube refined uniformly to level 2, 4x4x4 cells per block.
fn engine() -> AmrEngine {
  let dataset = SyntheticDataset::new(DAabb3::UNIT, [4, 4, 4])
    .uniform(2)
    .reverse_block_order(true)
    .field("rho", |p| 2.0 * p.x + 3.0 * p.y - p.z)
    .field("one", |_| 1.0)
    .field("bx", |p| p.y)
    .field("by", |p| p.z)
    .field("bz", |p| p.x)
    .build();
  AmrEngine::build(dataset, &EngineConfig::default()).expect("synthetic dataset is consistent")
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_build_stats() {
  let engine = engine();
  let stats = engine.stats();
  assert_eq!(stats.node_count, 73);
  assert_eq!(stats.leaf_count, 64);
  assert_eq!(stats.block_count, 64);
  assert_eq!(stats.root_count, 1);
  assert_eq!(stats.max_level, 2);
  assert!(stats.parallel_index);
  assert_eq!(stats.leaves_per_level.as_slice(), &[0, 0, 64]);
}

#[test]
fn test_sample_count_mismatch_is_fatal() {
  let mut dataset = SyntheticDataset::new(DAabb3::UNIT, [2, 2, 2])
    .uniform(1)
    .build();
  dataset.samples.truncate(dataset.samples.len() - 3);

  let err = AmrEngine::build(dataset, &EngineConfig::default()).unwrap_err();
  assert!(
    matches!(
      err,
      Error::Configuration(ConfigurationError::CellCountMismatch {
        rows: 63,
        expected_rows: 64,
        ..
      })
    ),
    "unexpected error: {err}"
  );
}

#[test]
fn test_missing_coordinates_is_fatal() {
  let mut dataset = SyntheticDataset::new(DAabb3::UNIT, [2, 2, 2]).build();
  dataset.variables[2] = "w".to_string();

  let err = AmrEngine::build(dataset, &EngineConfig::default()).unwrap_err();
  assert!(matches!(
    err,
    Error::Configuration(ConfigurationError::MissingCoordinate("z"))
  ));
}

#[test]
fn test_invalid_config_is_fatal() {
  let dataset = SyntheticDataset::new(DAabb3::UNIT, [2, 2, 2]).build();
  let config = EngineConfig {
    max_descent_depth: 0,
    ..EngineConfig::default()
  };
  assert!(AmrEngine::build(dataset, &config).is_err());
}

#[test]
fn test_mismatched_data_is_fatal() {
  let mut dataset = SyntheticDataset::new(DAabb3::UNIT, [2, 2, 2])
    .uniform(1)
    .build();
  // Move every x coordinate of the first block out of the domain
  for cell in 0..8 {
    dataset.samples[cell * 3] += 5.0;
  }

  let err = AmrEngine::build(dataset, &EngineConfig::default()).unwrap_err();
  assert!(matches!(
    err,
    Error::Consistency(ConsistencyError::AnchorNotInTree { .. })
  ));
}

// =============================================================================
// Interpolation
// =============================================================================

#[test]
fn test_interpolate_linear_field() {
  let engine = engine();
  let point = DVec3::new(0.3, 0.6, 0.85);
  let rho = engine.interpolate(point, "rho").expect("inside domain");
  assert!((rho - (0.6 + 1.8 - 0.85)).abs() < EPS, "rho = {rho}");
}

#[test]
fn test_interpolate_cell_center_is_exact() {
  let engine = engine();
  let rho = engine.resolve("rho").expect("declared");
  let cell = CellCoord::new(1, 2, 3, 17);

  let center = engine.cell_center(cell).expect("valid cell");
  let stored = engine.sample(rho, cell).expect("valid cell");
  assert_eq!(engine.interpolate_var(center, rho).ok(), Some(stored));
}

#[test]
fn test_every_cell_center_exact_on_non_dyadic_grid() {
  // 0.3 spacing has no exact binary form, so stored centers carry f32 rounding
  let domain = DAabb3::new(DVec3::splat(-1.3), DVec3::splat(1.7));
  let dataset = SyntheticDataset::new(domain, [5, 5, 5])
    .uniform(1)
    .field("rho", |p| 1000.0 * p.x + 7.0 * p.y * p.y - 3.0 * p.z)
    .build();
  let engine = AmrEngine::build(dataset, &EngineConfig::default()).expect("consistent dataset");
  let rho = engine.resolve("rho").expect("declared");

  for flat in 0..engine.fields().cell_count() {
    let cell = CellCoord::unflatten(flat, [5, 5, 5]);
    let center = engine.cell_center(cell).expect("valid cell");
    let stored = engine.sample(rho, cell).expect("valid cell");
    assert_eq!(
      engine.interpolate_var(center, rho).ok(),
      Some(stored),
      "cell {flat} at {center}"
    );
  }
}

#[test]
fn test_interpolate_in_rejects_unknown_block() {
  let engine = engine();
  let rho = engine.resolve("rho").expect("declared");
  let query = engine.query();
  let point = DVec3::splat(0.3);

  let block = engine.locate_block(point).expect("inside domain");
  assert!(query.interpolate_in(block, point, rho).is_ok());

  let err = query
    .interpolate_in(BlockId(64), point, rho)
    .expect_err("only 64 blocks");
  assert!(matches!(err, Error::BlockOutOfRange { blocks: 64, .. }), "{err}");
  assert!(err.is_recoverable());
}

#[test]
fn test_interpolate_vector() {
  let engine = engine();
  let point = DVec3::new(0.1, 0.45, 0.7);
  let b = engine.interpolate_vector(point, "b").expect("bx, by, bz declared");
  assert!((b - DVec3::new(0.45, 0.7, 0.1)).abs().max_element() < EPS, "b = {b}");

  assert!(matches!(
    engine.interpolate_vector(point, "u"),
    Err(Error::UnknownVariable(_))
  ));
}

#[test]
fn test_measure_is_cell_volume() {
  let engine = engine();
  let volume = engine
    .interpolate(DVec3::splat(0.5), "measure")
    .expect("measure is always present");
  assert_eq!(volume, 0.0625f64.powi(3));
  assert!((engine.total_measure() - 1.0).abs() < 1e-12);
}

#[test]
fn test_query_errors_leave_engine_usable() {
  let engine = engine();

  let err = engine.interpolate(DVec3::splat(2.0), "rho").unwrap_err();
  assert!(matches!(err, Error::OutOfDomain { .. }));
  let err = engine.interpolate(DVec3::splat(0.5), "foo").unwrap_err();
  assert!(matches!(err, Error::UnknownVariable(ref name) if name == "foo"));

  assert!(engine.interpolate(DVec3::splat(0.5), "rho").is_ok());
}

#[test]
fn test_interpolate_many() {
  let engine = engine();
  let points = [
    DVec3::new(0.3, 0.6, 0.85),
    DVec3::splat(-1.0),
    DVec3::new(0.8, 0.1, 0.4),
  ];

  let values = engine.interpolate_many(&points, "rho").expect("rho declared");
  assert_eq!(values.len(), 3);
  assert!(values[0].is_ok());
  assert!(matches!(values[1], Err(Error::OutOfDomain { .. })));
  let expected = engine.interpolate(points[2], "rho").expect("inside domain");
  assert_eq!(values[2].as_ref().ok(), Some(&expected));

  assert!(engine.interpolate_many(&points, "foo").is_err());
}

// =============================================================================
// Derivatives, integrals, selection
// =============================================================================

#[test]
fn test_derivative_of_linear_field() {
  let engine = engine();
  let cells = engine.fields().cell_count();
  for flat in [0, 1, 21, 63, 64 * 30 + 42, cells - 1] {
    let d = engine.derivative(flat, "rho").expect("valid cell");
    assert!(
      (d - DVec3::new(2.0, 3.0, -1.0)).abs().max_element() < 1e-3,
      "gradient at {flat} was {d}"
    );
  }
}

#[test]
fn test_derivative_index_out_of_range() {
  let engine = engine();
  let total = engine.fields().cell_count();
  let err = engine.derivative(total, "rho").unwrap_err();
  assert!(matches!(err, Error::CellIndexOutOfRange { index, total: t } if index == total && t == total));
  assert!(err.is_recoverable());
}

#[test]
fn test_integrate() {
  let engine = engine();
  let one = engine.integrate("one").expect("declared");
  assert!((one - 1.0).abs() < 1e-9, "integral of 1 was {one}");

  // Midpoint rule is exact for linear fields
  let rho = engine.integrate("rho").expect("declared");
  assert!((rho - 2.0).abs() < EPS, "integral of rho was {rho}");

  let measure = engine.integrate("measure").expect("always present");
  assert!((measure - 0.0625f64.powi(3)).abs() < 1e-12);
}

#[test]
fn test_blocks_with_spacing() {
  let dataset = SyntheticDataset::new(DAabb3::UNIT, [2, 2, 2])
    .refine_where(2, |bounds, _| bounds.min == DVec3::ZERO)
    .build();
  let engine = AmrEngine::build(dataset, &EngineConfig::default()).expect("consistent dataset");

  assert_eq!(engine.blocks_with_spacing(0.25, 1e-6).len(), 7);
  assert_eq!(engine.blocks_with_spacing(0.125, 1e-6).len(), 8);
  assert!(engine.blocks_with_spacing(0.5, 1e-6).is_empty());
}

#[test]
fn test_cell_access_bounds() {
  let engine = engine();
  let rho = engine.resolve("rho").expect("declared");
  assert!(engine.sample(rho, CellCoord::new(4, 0, 0, 0)).is_err());
  assert!(engine.cell_center(CellCoord::new(0, 0, 0, 64)).is_err());
  assert!(engine.block_grid(BlockId(63)).is_some());
  assert!(engine.block_grid(BlockId(64)).is_none());
  assert!(engine.node(NodeId(72)).is_some());
  assert!(engine.node(NodeId(73)).is_none());
}
