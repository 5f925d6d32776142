//! TreeGeometry - validated tree plus physical box of every node.
//!
//! For the tree-coordinate encoding the normalized box of a node at level `L`
//! with 1-based coordinate `c` along an axis is
//!
//! ```text
//! max_index = ((2^L - 1) * (ratio - 1) + 1) * root_count
//! min       = (c - 1) / max_index
//! max       =  c      / max_index
//! ```
//!
//! and the physical box is `domain.min + normalized * domain.size()`. Only
//! binary trees with one root per axis are supported (`max_index == 2^L`);
//! every other encoding is rejected up front.

use glam::DVec3;
use smallvec::SmallVec;

use super::{DAabb3, Node, NodeId, NodePlacement, NodeStatus, RawNode, RawTree, Tree};
use crate::config::EngineConfig;
use crate::error::{ConfigurationError, Result};

/// Levels beyond this overflow the integer max-index arithmetic.
const MAX_SUPPORTED_LEVEL: i64 = 62;

/// Build the validated tree with per-node boxes.
///
/// Pure function of its inputs; all native (1-based) numbers are translated
/// here and nowhere else.
#[tracing::instrument(skip_all, name = "tree::build_geometry", fields(nodes = raw.len()))]
pub fn build_geometry(raw: &RawTree, domain: DAabb3, config: &EngineConfig) -> Result<Tree> {
  if !domain.is_proper() {
    return Err(
      ConfigurationError::InvalidDomain {
        min: domain.min.to_array(),
        max: domain.max.to_array(),
      }
      .into(),
    );
  }

  let boxes: Vec<(DAabb3, DAabb3)> = match &raw.placement {
    NodePlacement::TreeCoordinates { ratio, root_count } => {
      if config.require_cubic_domain {
        check_cubic(&domain, config.cubic_tolerance)?;
      }
      raw
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
          let unit = normalized_position(index, node, *ratio, *root_count)?;
          Ok((unit, domain.denormalize(&unit)))
        })
        .collect::<Result<_>>()?
    }
    NodePlacement::Precomputed(physical) => {
      if physical.len() != raw.len() {
        return Err(
          ConfigurationError::BoxCountMismatch {
            boxes: physical.len(),
            nodes: raw.len(),
          }
          .into(),
        );
      }
      physical
        .iter()
        .map(|bounds| (domain.normalize(bounds), *bounds))
        .collect()
    }
  };

  let node_count = raw.len();
  let mut nodes = Vec::with_capacity(node_count);
  let mut roots: SmallVec<[NodeId; 8]> = SmallVec::new();

  {
    let _span = tracing::info_span!("link_nodes").entered();
    for (index, (node, (normalized, bounds))) in raw.nodes.iter().zip(boxes).enumerate() {
      let native = index as i64 + 1;
      let level = checked_level(native, node.level)?;

      let parent = if node.parent < 1 {
        None
      } else {
        Some(resolve(native, node.parent, node_count)?)
      };

      let children = match node.status {
        NodeStatus::Leaf => None,
        NodeStatus::Refined => {
          let mut ids = [NodeId(0); 8];
          for (slot, &child) in ids.iter_mut().zip(node.children.iter()) {
            let id = resolve(native, child, node_count)?;
            let child_level = raw.nodes[id.index()].level;
            if child_level != node.level + 1 {
              return Err(
                ConfigurationError::ChildLevelMismatch {
                  native,
                  level,
                  child,
                  child_level: child_level.clamp(0, u32::MAX as i64) as u32,
                }
                .into(),
              );
            }
            *slot = id;
          }
          Some(ids)
        }
      };

      if level == 0 {
        roots.push(NodeId(index as u32));
      }

      nodes.push(Node {
        level,
        parent,
        children,
        normalized,
        bounds,
      });
    }
  }

  if roots.is_empty() {
    return Err(ConfigurationError::NoRoot.into());
  }

  tracing::debug!(
    nodes = nodes.len(),
    roots = roots.len(),
    "tree geometry built"
  );

  Ok(Tree::from_parts(domain, nodes, roots))
}

/// Max integer tree index along each axis at `level`.
///
/// Returns None when the value does not fit in an `i64`.
pub fn max_index(level: u32, ratio: [i64; 3], root_count: [i64; 3]) -> Option<[i64; 3]> {
  let scale = 2i64.checked_pow(level)?.checked_sub(1)?;
  let mut out = [0; 3];
  for axis in 0..3 {
    out[axis] = scale
      .checked_mul(ratio[axis] - 1)?
      .checked_add(1)?
      .checked_mul(root_count[axis])?;
  }
  Some(out)
}

fn normalized_position(
  index: usize,
  node: &RawNode,
  ratio: [i64; 3],
  root_count: [i64; 3],
) -> Result<DAabb3> {
  let native = index as i64 + 1;
  let level = checked_level(native, node.level)?;
  let expected = 1i64 << level;
  let max = max_index(level, ratio, root_count).unwrap_or([i64::MAX; 3]);

  for axis in 0..3 {
    if max[axis] != expected {
      return Err(
        ConfigurationError::UnsupportedMaxIndex {
          native,
          level,
          axis,
          max_index: max[axis],
        }
        .into(),
      );
    }
    let coord = node.coord[axis];
    if coord < 1 || coord > max[axis] {
      return Err(
        ConfigurationError::CoordinateOutOfRange {
          native,
          axis,
          coord,
          max_index: max[axis],
        }
        .into(),
      );
    }
  }

  let max = DVec3::new(max[0] as f64, max[1] as f64, max[2] as f64);
  let coord = DVec3::new(
    node.coord[0] as f64,
    node.coord[1] as f64,
    node.coord[2] as f64,
  );
  Ok(DAabb3::new((coord - 1.0) / max, coord / max))
}

fn check_cubic(domain: &DAabb3, tolerance: f64) -> Result<()> {
  let size = domain.size();
  let scale = size.max_element();
  let spread = size.max_element() - size.min_element();
  if spread > tolerance * scale {
    return Err(
      ConfigurationError::NonCubicDomain {
        ranges: size.to_array(),
      }
      .into(),
    );
  }
  Ok(())
}

fn checked_level(native: i64, level: i64) -> Result<u32> {
  if level < 0 {
    return Err(ConfigurationError::NegativeLevel { native, level }.into());
  }
  if level > MAX_SUPPORTED_LEVEL {
    return Err(
      ConfigurationError::UnsupportedMaxIndex {
        native,
        level: level.min(u32::MAX as i64) as u32,
        axis: 0,
        max_index: i64::MAX,
      }
      .into(),
    );
  }
  Ok(level as u32)
}

fn resolve(native: i64, reference: i64, node_count: usize) -> Result<NodeId> {
  NodeId::from_native(reference)
    .filter(|id| id.index() < node_count)
    .ok_or_else(|| {
      ConfigurationError::DanglingReference {
        native,
        reference,
        node_count,
      }
      .into()
    })
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
