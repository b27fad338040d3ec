//! Sphere primitive.

use candela_math::{DVec3, Ray, THRESHOLD};

use crate::material::Material;
use crate::modifier::Modifier;
use crate::shape::{Facing, Hit, Shape, ShapeArena, ShapeId};

/// A sphere given by center and radius.
///
/// Intersection uses the geometric (projection) solution: project the center
/// onto the ray, then measure the half-chord. A ray starting inside takes
/// the far root, otherwise the near positive root.
pub struct Sphere {
    center: DVec3,
    radius: f64,
    material: Material,
    mods: Vec<Box<dyn Modifier>>,
}

impl Sphere {
    pub fn new(center: DVec3, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
            mods: Vec::new(),
        }
    }

    /// Append a modifier to the color chain.
    pub fn with_modifier(mut self, modifier: Box<dyn Modifier>) -> Self {
        self.mods.push(modifier);
        self
    }

    fn roots(&self, ray: &Ray) -> Option<(f64, f64)> {
        let a = self.center - ray.origin;
        let oc2 = a.dot(a);
        let ok = a.dot(ray.direction);
        let h2 = self.radius * self.radius - (oc2 - ok * ok);
        if h2 < 0.0 {
            return None;
        }
        let h = h2.sqrt();
        Some((ok - h, ok + h))
    }
}

impl Shape for Sphere {
    fn intersect(&self, _arena: &ShapeArena, self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        let a = self.center - ray.origin;
        let inside = a.dot(a) < self.radius * self.radius;
        let (near, far) = self.roots(ray)?;

        let (t, facing) = if inside {
            (far, Facing::Leave)
        } else {
            (near, Facing::Enter)
        };
        if t <= THRESHOLD {
            return None;
        }
        let point = ray.at(t);
        let normal = (point - self.center) / self.radius;
        Some(Hit::new(t, self_id, point, normal).with_facing(facing))
    }

    fn fill_normal(&self, hit: &mut Hit) {
        hit.normal = (hit.point - self.center) / self.radius;
    }

    fn contains(&self, _arena: &ShapeArena, point: DVec3) -> bool {
        (point - self.center).length() - self.radius < 0.0
    }

    fn all_intersections(
        &self,
        _arena: &ShapeArena,
        self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        let Some((near, far)) = self.roots(ray) else {
            return 0;
        };
        let mut n = 0;
        for (t, facing) in [(near, Facing::Enter), (far, Facing::Leave)] {
            if t > THRESHOLD {
                let point = ray.at(t);
                let normal = (point - self.center) / self.radius;
                out.push(Hit::new(t, self_id, point, normal).with_facing(facing));
                n += 1;
            }
        }
        n
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn modifiers(&self) -> &[Box<dyn Modifier>] {
        &self.mods
    }
}
