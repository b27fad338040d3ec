//! General quadric surface primitive.

use candela_math::{dvec3, DVec3, Ray, THRESHOLD};

use crate::material::Material;
use crate::modifier::Modifier;
use crate::shape::{Facing, Hit, Shape, ShapeArena, ShapeId};

/// A second-degree surface
/// `A x^2 + 2B xy + 2C xz + 2D x + E y^2 + 2F yz + 2G y + H z^2 + 2I z + J = 0`.
///
/// The solid interior is where the form evaluates negative. Root selection
/// follows the common convention of all primitives: nearest positive root.
pub struct Quadric {
    // Coefficients named after the symmetric-matrix layout above.
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
    g: f64,
    h: f64,
    i: f64,
    j: f64,
    material: Material,
    mods: Vec<Box<dyn Modifier>>,
}

impl Quadric {
    pub fn new(coeffs: [f64; 10], material: Material) -> Self {
        let [a, b, c, d, e, f, g, h, i, j] = coeffs;
        Self {
            a,
            b,
            c,
            d,
            e,
            f,
            g,
            h,
            i,
            j,
            material,
            mods: Vec::new(),
        }
    }

    /// Append a modifier to the color chain.
    pub fn with_modifier(mut self, modifier: Box<dyn Modifier>) -> Self {
        self.mods.push(modifier);
        self
    }

    /// Evaluate the quadratic form at a point.
    fn eval(&self, p: DVec3) -> f64 {
        self.a * p.x * p.x
            + 2.0 * self.b * p.x * p.y
            + 2.0 * self.c * p.x * p.z
            + 2.0 * self.d * p.x
            + self.e * p.y * p.y
            + 2.0 * self.f * p.y * p.z
            + 2.0 * self.g * p.y
            + self.h * p.z * p.z
            + 2.0 * self.i * p.z
            + self.j
    }

    /// Surface gradient (unnormalized normal) at a point.
    fn gradient(&self, p: DVec3) -> DVec3 {
        dvec3(
            2.0 * self.a * p.x + 2.0 * self.b * p.y + 2.0 * self.c * p.z + 2.0 * self.d,
            2.0 * self.e * p.y + 2.0 * self.f * p.z + 2.0 * self.g + 2.0 * self.b * p.x,
            2.0 * self.h * p.z + 2.0 * self.i + 2.0 * self.c * p.x + 2.0 * self.f * p.y,
        )
    }

    /// Both ray-parameter roots, unordered count 0..=2.
    fn roots(&self, ray: &Ray) -> ([f64; 2], usize) {
        let o = ray.origin;
        let d = ray.direction;
        let qa = self.a * d.x * d.x
            + 2.0 * self.b * d.x * d.y
            + 2.0 * self.c * d.x * d.z
            + self.e * d.y * d.y
            + 2.0 * self.f * d.y * d.z
            + self.h * d.z * d.z;
        let qb = 2.0
            * (self.a * o.x * d.x
                + self.b * (o.x * d.y + d.x * o.y)
                + self.c * (o.x * d.z + d.x * o.z)
                + self.d * d.x
                + self.e * o.y * d.y
                + self.f * (o.y * d.z + d.y * o.z)
                + self.g * d.y
                + self.h * o.z * d.z
                + self.i * d.z);
        let qc = self.eval(o);

        if qa.abs() < f64::EPSILON {
            // Degenerate to a linear equation (ray parallel to the ruled
            // direction of the surface).
            if qb.abs() < f64::EPSILON {
                return ([0.0; 2], 0);
            }
            return ([-qc / qb, 0.0], 1);
        }
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            return ([0.0; 2], 0);
        }
        let sq = disc.sqrt();
        ([(-qb - sq) / (2.0 * qa), (-qb + sq) / (2.0 * qa)], 2)
    }

    fn facing_at(&self, ray: &Ray, t: f64) -> Facing {
        if self.gradient(ray.at(t)).dot(ray.direction) < 0.0 {
            Facing::Enter
        } else {
            Facing::Leave
        }
    }
}

impl Shape for Quadric {
    fn intersect(&self, _arena: &ShapeArena, self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        let (roots, n) = self.roots(ray);
        // Nearest positive root.
        let t = roots[..n]
            .iter()
            .copied()
            .filter(|&t| t > THRESHOLD)
            .min_by(f64::total_cmp)?;
        Some(Hit::new(t, self_id, ray.at(t), DVec3::ZERO).with_facing(self.facing_at(ray, t)))
    }

    fn fill_normal(&self, hit: &mut Hit) {
        hit.normal = self.gradient(hit.point);
    }

    fn contains(&self, _arena: &ShapeArena, point: DVec3) -> bool {
        self.eval(point) < 0.0
    }

    fn all_intersections(
        &self,
        _arena: &ShapeArena,
        self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        let (roots, n) = self.roots(ray);
        let mut count = 0;
        for &t in &roots[..n] {
            if t > THRESHOLD {
                let point = ray.at(t);
                out.push(
                    Hit::new(t, self_id, point, self.gradient(point))
                        .with_facing(self.facing_at(ray, t)),
                );
                count += 1;
            }
        }
        count
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn modifiers(&self) -> &[Box<dyn Modifier>] {
        &self.mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit sphere as a quadric: x^2 + y^2 + z^2 - 1 = 0.
    fn unit_sphere() -> (ShapeArena, ShapeId) {
        let mut arena = ShapeArena::new();
        let id = arena.insert(Box::new(Quadric::new(
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, -1.0],
            Material::default(),
        )));
        (arena, id)
    }

    #[test]
    fn test_nearest_positive_root() {
        let (arena, id) = unit_sphere();
        let ray = Ray::new(dvec3(0.0, 0.0, 5.0), dvec3(0.0, 0.0, -1.0));
        let hit = arena.intersect(id, &ray).expect("must hit");
        // Near face at t = 4, not the far face at t = 6.
        assert!((hit.t - 4.0).abs() < 1e-9);
        assert_eq!(hit.facing, Facing::Enter);
    }

    #[test]
    fn test_inside_picks_exit_root() {
        let (arena, id) = unit_sphere();
        let ray = Ray::new(DVec3::ZERO, DVec3::X);
        let hit = arena.intersect(id, &ray).expect("must hit");
        assert!((hit.t - 1.0).abs() < 1e-9);
        assert_eq!(hit.facing, Facing::Leave);
    }

    #[test]
    fn test_normal_matches_gradient() {
        let (arena, id) = unit_sphere();
        let ray = Ray::new(dvec3(0.0, 0.0, 5.0), dvec3(0.0, 0.0, -1.0));
        let mut hit = arena.intersect(id, &ray).unwrap();
        arena.fill_normal(&mut hit);
        assert!((hit.normal.normalize() - DVec3::Z).length() < 1e-9);
    }

    #[test]
    fn test_round_trip_surface_equation() {
        let (arena, id) = unit_sphere();
        let ray = Ray::new(dvec3(3.0, 1.0, -2.0), dvec3(-2.0, -0.6, 1.4));
        if let Some(hit) = arena.intersect(id, &ray) {
            let p = ray.at(hit.t);
            assert!((p.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_contains_interior() {
        let (arena, id) = unit_sphere();
        assert!(arena.contains(id, dvec3(0.5, 0.0, 0.0)));
        assert!(!arena.contains(id, dvec3(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_miss() {
        let (arena, id) = unit_sphere();
        let ray = Ray::new(dvec3(0.0, 5.0, 0.0), DVec3::Y);
        assert!(arena.intersect(id, &ray).is_none());
    }
}
