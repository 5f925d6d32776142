//! AmrEngine - construction pipeline and query facade.
//!
//! Construction is a straight sequence of pure stages:
//!
//! ```text
//! Dataset ──► VariableIndex ──► build_geometry ──► FieldStore
//!                                     │                 │
//!                                     └──► BlockIndex ◄─┘
//!                                              │
//!                                  FieldStore::with_measure ──► AmrEngine
//! ```
//!
//! Any stage failing aborts construction; no partial engine is returned.
//! Once built, the engine is immutable and `Sync`, so queries may be issued
//! from any number of threads.

use glam::DVec3;
use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::field::{CellCoord, FieldStore, VarId, VariableIndex};
use crate::index::{BlockGrid, BlockIndex};
use crate::query::SpatialQuery;
use crate::stats::BuildStats;
use crate::tree::{build_geometry, BlockId, Node, NodeId, Tree};

/// Indexed AMR snapshot ready for queries.
#[derive(Clone, Debug)]
pub struct AmrEngine {
  config: EngineConfig,
  tree: Tree,
  index: BlockIndex,
  fields: FieldStore,
  stats: BuildStats,
}

impl AmrEngine {
  /// Validate and index `dataset`.
  #[tracing::instrument(skip_all, name = "engine::build", fields(nodes = dataset.tree.len()))]
  pub fn build(dataset: Dataset, config: &EngineConfig) -> Result<Self> {
    config.validate()?;

    let Dataset {
      block_size,
      domain,
      tree: raw,
      variables,
      samples,
    } = dataset;

    let variables = VariableIndex::new(&variables)?;
    let tree = build_geometry(&raw, domain, config)?;
    let fields = FieldStore::new(block_size, tree.leaf_count(), variables, samples)?;
    let index = BlockIndex::build(&tree, &fields, config)?;
    let fields = fields.with_measure(index.cell_volumes())?;

    let stats = BuildStats::from_tree(&tree, index.len(), config.parallel_index);
    tracing::debug!(
      nodes = stats.node_count,
      blocks = stats.block_count,
      max_level = stats.max_level,
      "engine built"
    );

    Ok(Self {
      config: config.clone(),
      tree,
      index,
      fields,
      stats,
    })
  }

  // ===========================================================================
  // Read access
  // ===========================================================================

  #[inline]
  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  #[inline]
  pub fn stats(&self) -> &BuildStats {
    &self.stats
  }

  #[inline]
  pub fn tree(&self) -> &Tree {
    &self.tree
  }

  /// Node record, None for ids past the end of the tree.
  #[inline]
  pub fn node(&self, id: NodeId) -> Option<&Node> {
    self.tree.get(id)
  }

  #[inline]
  pub fn block_index(&self) -> &BlockIndex {
    &self.index
  }

  /// Grid of `block`, None for ids past nBlock.
  pub fn block_grid(&self, block: BlockId) -> Option<&BlockGrid> {
    (block.index() < self.index.len()).then(|| self.index.grid(block))
  }

  #[inline]
  pub fn fields(&self) -> &FieldStore {
    &self.fields
  }

  #[inline]
  pub fn variables(&self) -> &VariableIndex {
    self.fields.variables()
  }

  /// Resolve a variable name once for repeated queries.
  #[inline]
  pub fn resolve(&self, name: &str) -> Result<VarId> {
    self.variables().resolve(name)
  }

  /// Resolve `<prefix>x`, `<prefix>y`, `<prefix>z`.
  #[inline]
  pub fn resolve_vector(&self, prefix: &str) -> Result<[VarId; 3]> {
    self.variables().resolve_vector(prefix)
  }

  /// Borrowed query view.
  #[inline]
  pub fn query(&self) -> SpatialQuery<'_> {
    SpatialQuery::new(&self.tree, &self.index, &self.fields, &self.config)
  }

  /// Stored value of `var` at one cell.
  pub fn sample(&self, var: VarId, cell: CellCoord) -> Result<f64> {
    let var = self.fields.checked_var(var)?;
    self.check_cell(cell)?;
    Ok(self.fields.value_at(var, cell))
  }

  /// Stored cell-center coordinates of one cell.
  pub fn cell_center(&self, cell: CellCoord) -> Result<DVec3> {
    self.check_cell(cell)?;
    Ok(self.fields.cell_center(cell))
  }

  /// Blocks whose spacing is within `tolerance` of `spacing` on every axis,
  /// i.e. all blocks of one refinement level.
  pub fn blocks_with_spacing(&self, spacing: f64, tolerance: f64) -> Vec<BlockId> {
    (0..self.index.len())
      .map(|b| BlockId(b as u32))
      .filter(|&block| {
        let grid = self.index.grid(block);
        (grid.spacing - DVec3::splat(spacing)).abs().max_element() <= tolerance
      })
      .collect()
  }

  // ===========================================================================
  // Queries
  // ===========================================================================

  #[inline]
  pub fn locate(&self, point: DVec3) -> Result<NodeId> {
    self.query().locate(point)
  }

  #[inline]
  pub fn locate_block(&self, point: DVec3) -> Result<BlockId> {
    self.query().locate_block(point)
  }

  /// Trilinear estimate of the variable `name` at `point`.
  pub fn interpolate(&self, point: DVec3, name: &str) -> Result<f64> {
    let var = self.resolve(name)?;
    self.query().interpolate(point, var)
  }

  #[inline]
  pub fn interpolate_var(&self, point: DVec3, var: VarId) -> Result<f64> {
    self.query().interpolate(point, var)
  }

  /// Interpolate the three components of a vector quantity, locating the
  /// point once.
  pub fn interpolate_vector(&self, point: DVec3, prefix: &str) -> Result<DVec3> {
    let [x, y, z] = self.resolve_vector(prefix)?;
    let query = self.query();
    let block = query.locate_block(point)?;
    Ok(DVec3::new(
      query.interpolate_in(block, point, x)?,
      query.interpolate_in(block, point, y)?,
      query.interpolate_in(block, point, z)?,
    ))
  }

  /// Interpolate `name` at many points on the rayon pool.
  ///
  /// The outer error is an unknown variable; every point then succeeds or
  /// fails on its own.
  pub fn interpolate_many(&self, points: &[DVec3], name: &str) -> Result<Vec<Result<f64>>> {
    let var = self.resolve(name)?;
    let query = self.query();
    Ok(
      points
        .par_iter()
        .map(|&point| query.interpolate(point, var))
        .collect(),
    )
  }

  /// Gradient of the variable `name` at flat cell index `flat`.
  pub fn derivative(&self, flat: usize, name: &str) -> Result<DVec3> {
    let var = self.resolve(name)?;
    self.query().derivative(flat, var)
  }

  #[inline]
  pub fn derivative_var(&self, flat: usize, var: VarId) -> Result<DVec3> {
    self.query().derivative(flat, var)
  }

  /// Volume integral of `name`: the sum of value times cell measure over
  /// every cell.
  pub fn integrate(&self, name: &str) -> Result<f64> {
    let var = self.resolve(name)?;
    let columns = self.variables().declared_len();
    let cells = self.fields.cells_per_block();

    Ok(
      (0..self.index.len())
        .into_par_iter()
        .map(|b| {
          let block = BlockId(b as u32);
          let measure = self.fields.measure(block);
          let sum: f64 = if var == self.variables().measure() {
            measure * cells as f64
          } else {
            self
              .fields
              .block_rows(block)
              .chunks_exact(columns)
              .map(|row| row[var.index()] as f64)
              .sum()
          };
          sum * measure
        })
        .sum(),
    )
  }

  /// Sum of all cell volumes. Equals the domain volume for a complete tree.
  pub fn total_measure(&self) -> f64 {
    let cells = self.fields.cells_per_block() as f64;
    (0..self.index.len())
      .map(|b| self.fields.measure(BlockId(b as u32)) * cells)
      .sum()
  }

  fn check_cell(&self, cell: CellCoord) -> Result<()> {
    let [ni, nj, nk] = self.fields.block_size();
    if cell.i >= ni || cell.j >= nj || cell.k >= nk || cell.block >= self.index.len() {
      return Err(Error::CellIndexOutOfRange {
        index: cell.flatten(self.fields.block_size()),
        total: self.fields.cell_count(),
      });
    }
    Ok(())
  }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
