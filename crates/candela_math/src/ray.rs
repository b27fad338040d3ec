use crate::DVec3;

/// A ray in 3D space with origin and unit direction.
///
/// The direction is normalized on construction, so the parameter `t` of
/// [`Ray::at`] is always a world-space distance from the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized; a zero direction is
    /// left as-is and will simply never intersect anything.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get the point along the ray at distance t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}
