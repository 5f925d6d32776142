//! Axis-aligned bounding box with double precision for node extents.

use glam::DVec3;

/// Double-precision axis-aligned bounding box.
///
/// Used for the global simulation domain, the physical box of every tree
/// node, and the normalized `[0, 1]^3` tree position. Containment is closed
/// on all faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DAabb3 {
  /// Minimum corner (inclusive).
  pub min: DVec3,
  /// Maximum corner (inclusive).
  pub max: DVec3,
}

impl DAabb3 {
  /// Unit cube `[0, 1]^3`.
  pub const UNIT: Self = Self {
    min: DVec3::ZERO,
    max: DVec3::ONE,
  };

  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Create from the `[xmin, ymin, zmin, xmax, ymax, zmax]` layout used by
  /// tree metadata tables.
  pub fn from_extents(extents: [f64; 6]) -> Self {
    Self::new(
      DVec3::new(extents[0], extents[1], extents[2]),
      DVec3::new(extents[3], extents[4], extents[5]),
    )
  }

  /// True when min < max strictly on every axis.
  #[inline]
  pub fn is_proper(&self) -> bool {
    self.min.x < self.max.x && self.min.y < self.max.y && self.min.z < self.max.z
  }

  /// Check if this AABB contains a point (closed on all faces).
  #[inline]
  pub fn contains_point(&self, point: DVec3) -> bool {
    point.x >= self.min.x
      && point.x <= self.max.x
      && point.y >= self.min.y
      && point.y <= self.max.y
      && point.z >= self.min.z
      && point.z <= self.max.z
  }

  /// Check if `other` lies entirely inside this box, allowing `eps` slack.
  #[inline]
  pub fn contains_box(&self, other: &DAabb3, eps: f64) -> bool {
    other.min.cmpge(self.min - DVec3::splat(eps)).all()
      && other.max.cmple(self.max + DVec3::splat(eps)).all()
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> DVec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> DVec3 {
    (self.min + self.max) * 0.5
  }

  /// Box volume.
  #[inline]
  pub fn volume(&self) -> f64 {
    let size = self.size();
    size.x * size.y * size.z
  }

  /// Map a normalized `[0, 1]^3` box into this box.
  #[inline]
  pub fn denormalize(&self, unit: &DAabb3) -> DAabb3 {
    let size = self.size();
    DAabb3 {
      min: self.min + unit.min * size,
      max: self.min + unit.max * size,
    }
  }

  /// Inverse of [`DAabb3::denormalize`].
  #[inline]
  pub fn normalize(&self, physical: &DAabb3) -> DAabb3 {
    let size = self.size();
    DAabb3 {
      min: (physical.min - self.min) / size,
      max: (physical.max - self.min) / size,
    }
  }

  /// Max absolute corner difference between two boxes.
  #[inline]
  pub fn max_corner_distance(&self, other: &DAabb3) -> f64 {
    (self.min - other.min)
      .abs()
      .max_element()
      .max((self.max - other.max).abs().max_element())
  }

  /// Corners as `[xmin, ymin, zmin, xmax, ymax, zmax]`.
  pub fn to_extents(&self) -> [f64; 6] {
    [
      self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
    ]
  }
}
