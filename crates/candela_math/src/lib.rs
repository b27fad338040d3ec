//! Numeric foundation for the candela ray tracer.
//!
//! Everything here is plain analytic geometry: rays, the pinhole camera that
//! turns pixel coordinates into rays, and closed-form cubic/quartic root
//! finding for the torus intersection. All of it works in `f64` (`DVec3`);
//! the quartic solver in particular loses too much precision in `f32`.

// Re-export glam for convenience
pub use glam::{dvec3, DVec3};

mod camera;
mod poly;
mod ray;

pub use camera::Camera;
pub use poly::{solve_cubic, solve_quartic, QuarticRoot};
pub use ray::Ray;

/// Distance threshold guarding near-degenerate comparisons: denominators,
/// self-intersection offsets, shading dot-product gates.
pub const THRESHOLD: f64 = 1e-3;
