//! amr_blocktree - spatial index and interpolation over block-structured AMR
//!
//! A simulation snapshot arrives as an octree of nodes (refined or leaf) and
//! one fixed-size regular grid of cell samples per leaf. This crate validates
//! the tree, computes every node's physical box, pairs leaves with data
//! blocks and then answers read-only queries:
//!
//! - **Point location**: leaf (and block) containing a point
//! - **Trilinear interpolation**: field value at an arbitrary point
//! - **Finite differences**: spatial gradient at a cell
//! - **Integration**: volume integrals using the per-cell measure
//!
//! # Example
//!
//! ```ignore
//! use amr_blocktree::{AmrEngine, DAabb3, EngineConfig, SyntheticDataset};
//! use glam::DVec3;
//!
//! let dataset = SyntheticDataset::new(DAabb3::UNIT, [8, 8, 8])
//!   .uniform(2)
//!   .field("rho", |p| p.x * p.y)
//!   .build();
//! let engine = AmrEngine::build(dataset, &EngineConfig::default())?;
//!
//! let rho = engine.interpolate(DVec3::new(0.3, 0.6, 0.1), "rho")?;
//! ```

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod field;
pub mod index;
pub mod query;
pub mod stats;
pub mod synthetic;
pub mod tree;

// Re-export commonly used items
pub use config::EngineConfig;
pub use dataset::Dataset;
pub use engine::AmrEngine;
pub use error::{ConfigurationError, ConsistencyError, Error, Result};
pub use field::{CellCoord, FieldStore, Sample, VarId, VariableIndex, COORDINATES, MEASURE};
pub use index::{BlockGrid, BlockIndex};
pub use query::SpatialQuery;
pub use stats::BuildStats;
pub use synthetic::SyntheticDataset;
pub use tree::{
  BlockId, DAabb3, Node, NodeId, NodePlacement, NodeStatus, RawNode, RawTree, Tree,
};
