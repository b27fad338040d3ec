//! Pinhole camera for ray generation.

use crate::{DVec3, Ray};

/// Pinhole camera that maps frame pixels to world-space rays.
///
/// The projection plane sits `proj_dist` in front of the camera location;
/// its physical extent (`wp` x `hp`) is derived from `size` and the frame
/// aspect ratio, so rays stay square regardless of resolution.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera location.
    pub loc: DVec3,
    /// Orthonormal camera basis.
    pub dir: DVec3,
    pub up: DVec3,
    pub right: DVec3,
    /// Point of interest the camera looks at.
    pub at: DVec3,
    /// Near projection plane distance.
    pub proj_dist: f64,
    /// Far clip distance (kept for completeness; the tracer never clips).
    pub far_clip: f64,
    /// Inner projection rectangle size.
    pub size: f64,
    /// Frame size in pixels.
    pub frame_w: u32,
    pub frame_h: u32,
    // Projection plane extent, derived by update_proj().
    wp: f64,
    hp: f64,
}

impl Camera {
    /// Create a camera with default settings, looking down -Z from (0, 0, 5).
    pub fn new() -> Self {
        let mut cam = Self {
            loc: DVec3::new(0.0, 0.0, 5.0),
            dir: DVec3::new(0.0, 0.0, -1.0),
            up: DVec3::Y,
            right: DVec3::X,
            at: DVec3::ZERO,
            proj_dist: 0.1,
            far_clip: 500.0,
            size: 0.1,
            frame_w: 30,
            frame_h: 30,
            wp: 0.1,
            hp: 0.1,
        };
        cam.update_proj();
        cam
    }

    /// Get the ray from the camera location through pixel (xs, ys).
    ///
    /// Coordinates are fractional; pass `x + 0.5, y + 0.5` for pixel centers.
    pub fn frame_ray(&self, xs: f64, ys: f64) -> Ray {
        let q = self.dir * self.proj_dist
            + self.right * ((xs - self.frame_w as f64 / 2.0) * self.wp / self.frame_w as f64)
            + self.up * ((self.frame_h as f64 / 2.0 - ys) * self.hp / self.frame_h as f64);

        Ray::new(self.loc + q, q)
    }

    /// Set projection properties.
    pub fn set_proj(&mut self, size: f64, proj_dist: f64, far_clip: f64) -> &mut Self {
        self.size = size;
        self.proj_dist = proj_dist;
        self.far_clip = far_clip;
        self.update_proj();
        self
    }

    /// Resize the camera frame in pixels.
    pub fn resize(&mut self, frame_w: u32, frame_h: u32) -> &mut Self {
        self.frame_w = frame_w;
        self.frame_h = frame_h;
        self.update_proj();
        self
    }

    /// Set the camera by location, point of interest and approximate up
    /// vector; rebuilds an orthonormal basis.
    pub fn set_loc_at_up(&mut self, loc: DVec3, at: DVec3, up: DVec3) -> &mut Self {
        self.loc = loc;
        self.at = at;
        self.dir = (at - loc).normalize();
        self.right = self.dir.cross(up).normalize();
        self.up = self.right.cross(self.dir);
        self.update_proj();
        self
    }

    /// Recompute the projection plane extent for the current frame aspect.
    fn update_proj(&mut self) {
        let mut rx = self.size / 2.0;
        let mut ry = self.size / 2.0;

        if self.frame_w > self.frame_h {
            rx *= self.frame_w as f64 / self.frame_h as f64;
        } else {
            ry *= self.frame_h as f64 / self.frame_w as f64;
        }
        self.wp = rx * 2.0;
        self.hp = ry * 2.0;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_forward() {
        let mut cam = Camera::new();
        cam.resize(100, 100);
        let ray = cam.frame_ray(50.0, 50.0);
        assert!((ray.direction - cam.dir).length() < 1e-9);
        // Ray starts on the projection plane, not at the camera location.
        assert!((ray.origin - (cam.loc + cam.dir * cam.proj_dist)).length() < 1e-9);
    }

    #[test]
    fn test_look_at_builds_orthonormal_basis() {
        let mut cam = Camera::new();
        cam.set_loc_at_up(DVec3::new(10.0, 0.0, 0.0), DVec3::ZERO, DVec3::Y);
        assert!((cam.dir - DVec3::new(-1.0, 0.0, 0.0)).length() < 1e-9);
        assert!(cam.dir.dot(cam.up).abs() < 1e-9);
        assert!(cam.dir.dot(cam.right).abs() < 1e-9);
        assert!(cam.up.dot(cam.right).abs() < 1e-9);
    }

    #[test]
    fn test_aspect_ratio_widens_plane() {
        let mut cam = Camera::new();
        cam.resize(200, 100);
        // A corner ray on the wide axis must deviate more than on the tall
        // axis; compare horizontal and vertical half-frame rays.
        let r_right = cam.frame_ray(200.0, 50.0);
        let r_top = cam.frame_ray(100.0, 0.0);
        let dx = r_right.direction.cross(cam.dir).length();
        let dy = r_top.direction.cross(cam.dir).length();
        assert!(dx > dy);
    }
}
