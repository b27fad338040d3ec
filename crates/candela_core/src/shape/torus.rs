//! Torus primitive.

use candela_math::{dvec3, solve_quartic, DVec3, Ray, THRESHOLD};

use crate::material::Material;
use crate::modifier::Modifier;
use crate::shape::{Facing, Hit, Shape, ShapeArena, ShapeId};

/// Imaginary parts below this are treated as numeric noise and the root as
/// real.
const IMAG_TOLERANCE: f64 = 1e-6;

/// A torus around the Z axis: major radius `major` to the tube center,
/// tube radius `minor`.
///
/// The ray equation is a quartic, solved in torus-local space through the
/// cubic resolvent; the smallest positive real root wins.
pub struct Torus {
    center: DVec3,
    major: f64,
    minor: f64,
    material: Material,
    mods: Vec<Box<dyn Modifier>>,
}

impl Torus {
    pub fn new(center: DVec3, major: f64, minor: f64, material: Material) -> Self {
        Self {
            center,
            major,
            minor,
            material,
            mods: Vec::new(),
        }
    }

    /// Append a modifier to the color chain.
    pub fn with_modifier(mut self, modifier: Box<dyn Modifier>) -> Self {
        self.mods.push(modifier);
        self
    }

    /// Implicit surface value at a torus-local point: negative inside the
    /// tube.
    fn eval_local(&self, p: DVec3) -> f64 {
        let s = p.length_squared();
        let k = s + self.major * self.major - self.minor * self.minor;
        k * k - 4.0 * self.major * self.major * (p.x * p.x + p.y * p.y)
    }

    /// All positive real quartic roots for the ray, in torus-local space.
    fn positive_roots(&self, ray: &Ray) -> Vec<f64> {
        let o = ray.origin - self.center;
        let d = ray.direction;

        let r2 = self.major * self.major;
        let r02 = self.minor * self.minor;
        let qa = o.dot(o);
        let qb = o.dot(d) * 2.0;
        let qc = d.dot(d);
        let qd = r2 - r02;
        let qe = qa - o.z * o.z;
        let qf = qb - 2.0 * d.z * o.z;
        let qg = qc - d.z * d.z;

        if qc.abs() < f64::EPSILON {
            return Vec::new();
        }

        let a_d = qa + qd;
        let c2 = qc * qc;
        let r42 = 4.0 * r2;
        let roots = solve_quartic(
            2.0 * qb / qc,
            (qb * qb + 2.0 * qc * a_d - r42 * qg) / c2,
            (2.0 * qb * a_d - r42 * qf) / c2,
            (a_d * a_d - r42 * qe) / c2,
        );

        roots
            .iter()
            .filter(|r| r.is_real(IMAG_TOLERANCE))
            .map(|r| r.re)
            .filter(|&t| t > THRESHOLD)
            .collect()
    }

    fn local_normal(&self, local: DVec3) -> DVec3 {
        // Direction from the nearest point on the central circle.
        let ring = dvec3(local.x, local.y, 0.0).normalize_or_zero() * self.major;
        (local - ring).normalize_or_zero()
    }
}

impl Shape for Torus {
    fn intersect(&self, _arena: &ShapeArena, self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        let t = self
            .positive_roots(ray)
            .into_iter()
            .min_by(f64::total_cmp)?;
        let point = ray.at(t);
        let normal = self.local_normal(point - self.center);
        let facing = if normal.dot(ray.direction) < 0.0 {
            Facing::Enter
        } else {
            Facing::Leave
        };
        Some(Hit::new(t, self_id, point, normal).with_facing(facing))
    }

    fn fill_normal(&self, hit: &mut Hit) {
        hit.normal = self.local_normal(hit.point - self.center);
    }

    fn contains(&self, _arena: &ShapeArena, point: DVec3) -> bool {
        self.eval_local(point - self.center) < 0.0
    }

    fn all_intersections(
        &self,
        _arena: &ShapeArena,
        self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        let mut n = 0;
        for t in self.positive_roots(ray) {
            let point = ray.at(t);
            let normal = self.local_normal(point - self.center);
            let facing = if normal.dot(ray.direction) < 0.0 {
                Facing::Enter
            } else {
                Facing::Leave
            };
            out.push(Hit::new(t, self_id, point, normal).with_facing(facing));
            n += 1;
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
