//! Infinite plane primitive.

use candela_math::{DVec3, Ray, THRESHOLD};

use crate::material::Material;
use crate::modifier::Modifier;
use crate::shape::{Facing, Hit, Shape, ShapeArena, ShapeId};

/// A plane given by a point on it and its normal.
///
/// As a solid it is the closed half-space behind the normal, which is what
/// the CSG membership test reports.
pub struct Plane {
    point: DVec3,
    normal: DVec3,
    material: Material,
    mods: Vec<Box<dyn Modifier>>,
}

impl Plane {
    pub fn new(point: DVec3, normal: DVec3, material: Material) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            material,
            mods: Vec::new(),
        }
    }

    /// Append a modifier to the color chain.
    pub fn with_modifier(mut self, modifier: Box<dyn Modifier>) -> Self {
        self.mods.push(modifier);
        self
    }

    fn solve(&self, ray: &Ray) -> Option<(f64, f64)> {
        let dp = self.normal.dot(ray.direction);
        // Near-parallel rays never hit.
        if dp.abs() < THRESHOLD {
            return None;
        }
        let t = self.normal.dot(self.point - ray.origin) / dp;
        (t > THRESHOLD).then_some((t, dp))
    }
}

impl Shape for Plane {
    fn intersect(&self, _arena: &ShapeArena, self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        let (t, dp) = self.solve(ray)?;
        let facing = if dp < 0.0 { Facing::Enter } else { Facing::Leave };
        Some(Hit::new(t, self_id, ray.at(t), self.normal).with_facing(facing))
    }

    fn fill_normal(&self, hit: &mut Hit) {
        hit.normal = self.normal;
    }

    fn contains(&self, _arena: &ShapeArena, point: DVec3) -> bool {
        self.normal.dot(point - self.point) <= 0.0
    }

    fn all_intersections(
        &self,
        _arena: &ShapeArena,
        self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        match self.solve(ray) {
            Some((t, dp)) => {
                let facing = if dp < 0.0 { Facing::Enter } else { Facing::Leave };
                out.push(Hit::new(t, self_id, ray.at(t), self.normal).with_facing(facing));
                1
            }
            None => 0,
        }
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn modifiers(&self) -> &[Box<dyn Modifier>] {
        &self.mods
    }
}
