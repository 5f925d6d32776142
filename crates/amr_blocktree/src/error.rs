//! Error types for engine construction and queries.
//!
//! Construction failures ([`Error::Configuration`], [`Error::Consistency`])
//! are fatal: no engine is returned. Query failures leave the engine usable.

use std::path::PathBuf;

use thiserror::Error;

use crate::field::VarId;
use crate::tree::{BlockId, NodeId};

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or unsupported input encoding.
  #[error("configuration error: {0}")]
  Configuration(#[from] ConfigurationError),

  /// Tree and field data disagree, or an internal invariant failed.
  #[error("consistency error: {0}")]
  Consistency(#[from] ConsistencyError),

  /// Query point lies outside the global domain.
  #[error("point ({}, {}, {}) lies outside the simulation domain", point[0], point[1], point[2])]
  OutOfDomain { point: [f64; 3] },

  /// Requested variable is not part of the dataset.
  #[error("unknown variable `{0}`")]
  UnknownVariable(String),

  /// Block id beyond the last block.
  #[error("block {block} out of range (dataset has {blocks} blocks)")]
  BlockOutOfRange { block: BlockId, blocks: usize },

  /// Flat cell index beyond the last cell.
  #[error("cell index {index} out of range (dataset has {total} cells)")]
  CellIndexOutOfRange { index: usize, total: usize },
}

impl Error {
  /// Query errors that leave the engine untouched and may be retried with
  /// different input.
  pub fn is_recoverable(&self) -> bool {
    matches!(
      self,
      Error::OutOfDomain { .. }
        | Error::UnknownVariable(_)
        | Error::BlockOutOfRange { .. }
        | Error::CellIndexOutOfRange { .. }
    )
  }
}

/// Input encoding problems detected while building the engine.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  #[error("domain bounds must satisfy min < max on every axis, got min={min:?} max={max:?}")]
  InvalidDomain { min: [f64; 3], max: [f64; 3] },

  #[error("domain is not cubic: axis ranges are {ranges:?}")]
  NonCubicDomain { ranges: [f64; 3] },

  #[error(
    "node {native} at level {level}: max index {max_index} on axis {axis} is not 2^{level}"
  )]
  UnsupportedMaxIndex {
    native: i64,
    level: u32,
    axis: usize,
    max_index: i64,
  },

  #[error("node {native}: tree coordinate {coord} on axis {axis} is outside 1..={max_index}")]
  CoordinateOutOfRange {
    native: i64,
    axis: usize,
    coord: i64,
    max_index: i64,
  },

  #[error("block size must be at least 2 cells per axis, got {0:?}")]
  InvalidBlockSize([usize; 3]),

  #[error("sample table has {rows} rows of {columns} values, expected {expected_rows} rows for {blocks} blocks")]
  CellCountMismatch {
    rows: usize,
    columns: usize,
    expected_rows: usize,
    blocks: usize,
  },

  #[error("sample table length {len} is not a multiple of the variable count {columns}")]
  RaggedSamples { len: usize, columns: usize },

  #[error("variable `{0}` is declared more than once")]
  DuplicateVariable(String),

  #[error("variable name `{0}` is reserved")]
  ReservedVariable(String),

  #[error("coordinate variable `{0}` is missing")]
  MissingCoordinate(&'static str),

  #[error("node {native} references node {reference}, but the tree has {node_count} nodes")]
  DanglingReference {
    native: i64,
    reference: i64,
    node_count: usize,
  },

  #[error("node {native} at level {level} has child {child} at level {child_level}")]
  ChildLevelMismatch {
    native: i64,
    level: u32,
    child: i64,
    child_level: u32,
  },

  #[error("child count must be 0 or 8, got {0}")]
  InvalidChildCount(i64),

  #[error("node {native} has negative AMR level {level}")]
  NegativeLevel { native: i64, level: i64 },

  #[error("tree has no AMR level 0 node")]
  NoRoot,

  #[error("precomputed box table has {boxes} entries for {nodes} nodes")]
  BoxCountMismatch { boxes: usize, nodes: usize },

  #[error("invalid engine configuration: {0}")]
  InvalidConfig(String),

  #[error("failed to read config {path}: {source}")]
  ConfigIo {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  ConfigParse(#[from] toml::de::Error),
}

/// Tree/data mismatches and violated structural invariants.
#[derive(Debug, Error)]
pub enum ConsistencyError {
  #[error("anchor ({}, {}, {}) of block {block} matches no leaf in the tree", anchor[0], anchor[1], anchor[2])]
  AnchorNotInTree { block: BlockId, anchor: [f64; 3] },

  #[error("cell faces of block {block} do not match the box of its leaf {node}")]
  ExtentMismatch { block: BlockId, node: NodeId },

  #[error("no AMR level 0 node contains ({}, {}, {})", point[0], point[1], point[2])]
  NoRootContains { point: [f64; 3] },

  #[error("refined node {node} has no child containing ({}, {}, {})", point[0], point[1], point[2])]
  NoChildContains { node: NodeId, point: [f64; 3] },

  #[error("tree descent exceeded {max_depth} levels at node {node}")]
  DescentTooDeep { node: NodeId, max_depth: u32 },

  #[error("cell index {index} decoded to (i={i}, j={j}, k={k}, block={block}) which re-encodes to {reencoded}")]
  FlatIndexMismatch {
    index: usize,
    i: usize,
    j: usize,
    k: usize,
    block: usize,
    reencoded: usize,
  },

  #[error("leaf {node} is claimed by blocks {first} and {second}")]
  DuplicateOwner {
    node: NodeId,
    first: BlockId,
    second: BlockId,
  },

  #[error("leaf {node} has no block")]
  UnassignedLeaf { node: NodeId },

  #[error("block {block} has non-positive grid spacing {spacing:?}")]
  DegenerateSpacing { block: BlockId, spacing: [f64; 3] },

  #[error("variable id {0:?} is not part of this field store")]
  ForeignVariable(VarId),
}
