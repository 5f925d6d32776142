//! Point location: find the leaf whose box contains a point.
//!
//! # Algorithm
//!
//! 1. Reject points outside the global domain.
//! 2. Scan the level-0 nodes in ascending id order; the first whose box
//!    contains the point is the starting node. Overlapping roots therefore
//!    resolve to the lowest node id.
//! 3. Descend: test the children in octant order and step into the first
//!    one containing the point, until a leaf is reached.
//!
//! Boxes are closed, so a point on a shared face belongs to whichever sibling
//! is tested first. Descent is capped at `max_depth` steps.

use glam::DVec3;

use crate::error::{ConsistencyError, Error, Result};
use crate::tree::{NodeId, Tree};

/// Locate the leaf containing `point`.
pub fn locate(tree: &Tree, point: DVec3, max_depth: u32) -> Result<NodeId> {
  if !tree.domain().contains_point(point) {
    return Err(Error::OutOfDomain {
      point: point.to_array(),
    });
  }

  let mut current = tree
    .roots()
    .iter()
    .copied()
    .find(|&root| tree.node(root).bounds.contains_point(point))
    .ok_or(ConsistencyError::NoRootContains {
      point: point.to_array(),
    })?;

  let mut depth = 0;
  while let Some(children) = tree.node(current).children {
    if depth == max_depth {
      return Err(
        ConsistencyError::DescentTooDeep {
          node: current,
          max_depth,
        }
        .into(),
      );
    }
    current = children
      .iter()
      .copied()
      .find(|&child| tree.node(child).bounds.contains_point(point))
      .ok_or(ConsistencyError::NoChildContains {
        node: current,
        point: point.to_array(),
      })?;
    depth += 1;
  }

  Ok(current)
}

#[cfg(test)]
#[path = "locate_test.rs"]
mod locate_test;
