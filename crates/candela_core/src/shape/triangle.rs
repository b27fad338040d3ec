//! Triangle primitive with precomputed barycentric basis.

use candela_math::{DVec3, Ray, THRESHOLD};

use crate::material::Material;
use crate::modifier::Modifier;
use crate::shape::{Facing, Hit, Shape, ShapeArena, ShapeId};

/// A triangle, flat-shaded or with interpolated vertex normals.
///
/// The constructor precomputes the dual basis of the edge vectors, so each
/// intersection resolves barycentric coordinates with two dot products
/// instead of solving a 2x2 system.
pub struct Triangle {
    p0: DVec3,
    p1: DVec3,
    p2: DVec3,
    /// Face normal (unit).
    normal: DVec3,
    /// Vertex normals for smooth shading, in p0/p1/p2 order.
    vertex_normals: Option<[DVec3; 3]>,
    /// Dual basis rows and offsets for barycentric evaluation.
    u1: DVec3,
    v1: DVec3,
    u0: f64,
    v0: f64,
    /// Zero-area triangles never intersect.
    degenerate: bool,
    material: Material,
    mods: Vec<Box<dyn Modifier>>,
}

impl Triangle {
    /// Create a flat-shaded triangle.
    pub fn new(p0: DVec3, p1: DVec3, p2: DVec3, material: Material) -> Self {
        Self::build(p0, p1, p2, None, material)
    }

    /// Create a triangle with per-vertex normals for smooth shading.
    pub fn smooth(
        p0: DVec3,
        p1: DVec3,
        p2: DVec3,
        normals: [DVec3; 3],
        material: Material,
    ) -> Self {
        Self::build(p0, p1, p2, Some(normals), material)
    }

    fn build(
        p0: DVec3,
        p1: DVec3,
        p2: DVec3,
        vertex_normals: Option<[DVec3; 3]>,
        material: Material,
    ) -> Self {
        let s1 = p1 - p0;
        let s2 = p2 - p0;
        let normal = s1.cross(s2).normalize_or_zero();
        let denom = s1.dot(s1) * s2.dot(s2) - s1.dot(s2) * s1.dot(s2);
        let degenerate = denom.abs() < 1e-12 || normal == DVec3::ZERO;

        let (u1, v1) = if degenerate {
            (DVec3::ZERO, DVec3::ZERO)
        } else {
            (
                (s1 * s2.dot(s2) - s2 * s1.dot(s2)) / denom,
                (s2 * s1.dot(s1) - s1 * s1.dot(s2)) / denom,
            )
        };

        Self {
            p0,
            p1,
            p2,
            normal,
            vertex_normals,
            u1,
            v1,
            u0: p0.dot(u1),
            v0: p0.dot(v1),
            degenerate,
            material,
            mods: Vec::new(),
        }
    }

    /// Append a modifier to the color chain.
    pub fn with_modifier(mut self, modifier: Box<dyn Modifier>) -> Self {
        self.mods.push(modifier);
        self
    }

    pub fn vertices(&self) -> (DVec3, DVec3, DVec3) {
        (self.p0, self.p1, self.p2)
    }

    /// Per-vertex normals, present only for smooth-shaded triangles.
    pub fn vertex_normals(&self) -> Option<[DVec3; 3]> {
        self.vertex_normals
    }

    /// Hit test producing (t, shading normal, facing).
    fn solve(&self, ray: &Ray) -> Option<(f64, DVec3, Facing)> {
        if self.degenerate {
            return None;
        }
        let nd = self.normal.dot(ray.direction);
        if nd.abs() < THRESHOLD {
            return None;
        }
        let t = self.normal.dot(self.p0 - ray.origin) / nd;
        if t <= THRESHOLD {
            return None;
        }
        let p = ray.at(t);
        let u = p.dot(self.u1) - self.u0;
        let v = p.dot(self.v1) - self.v0;
        if u <= 0.0 || v <= 0.0 || u + v > 1.0 {
            return None;
        }

        let normal = match &self.vertex_normals {
            Some([n0, n1, n2]) => {
                let w = 1.0 - u - v;
                *n0 * w + *n1 * u + *n2 * v
            }
            None => self.normal,
        };
        let facing = if nd < 0.0 { Facing::Enter } else { Facing::Leave };
        Some((t, normal, facing))
    }
}

impl Shape for Triangle {
    fn intersect(&self, _arena: &ShapeArena, self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        self.solve(ray)
            .map(|(t, normal, facing)| Hit::new(t, self_id, ray.at(t), normal).with_facing(facing))
    }

    fn all_intersections(
        &self,
        _arena: &ShapeArena,
        self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        match self.solve(ray) {
            Some((t, normal, facing)) => {
                out.push(Hit::new(t, self_id, ray.at(t), normal).with_facing(facing));
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

#[cfg(test)]
mod tests {
    use super::*;
    use candela_math::dvec3;

    fn xy_triangle() -> Triangle {
        Triangle::new(
            dvec3(0.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(0.0, 2.0, 0.0),
            Material::default(),
        )
    }

    fn arena_with(tri: Triangle) -> (ShapeArena, ShapeId) {
        let mut arena = ShapeArena::new();
        let id = arena.insert(Box::new(tri));
        (arena, id)
    }

    #[test]
    fn test_interior_hit() {
        let (arena, id) = arena_with(xy_triangle());
        let ray = Ray::new(dvec3(0.5, 0.5, 5.0), dvec3(0.0, 0.0, -1.0));
        let hit = arena.intersect(id, &ray).expect("must hit");
        assert!((hit.t - 5.0).abs() < 1e-9);
        assert!((hit.normal - DVec3::Z).length() < 1e-9);
    }

    #[test]
    fn test_outside_barycentric_miss() {
        let (arena, id) = arena_with(xy_triangle());
        let ray = Ray::new(dvec3(1.5, 1.5, 5.0), dvec3(0.0, 0.0, -1.0));
        assert!(arena.intersect(id, &ray).is_none());
    }

    #[test]
    fn test_edge_parallel_ray_misses() {
        let (arena, id) = arena_with(xy_triangle());
        let ray = Ray::new(dvec3(0.5, 0.5, 5.0), DVec3::X);
        assert!(arena.intersect(id, &ray).is_none());
    }

    #[test]
    fn test_smooth_normal_interpolation() {
        let tri = Triangle::smooth(
            dvec3(0.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(0.0, 2.0, 0.0),
            [
                dvec3(0.0, 0.0, 1.0),
                dvec3(1.0, 0.0, 0.0),
                dvec3(0.0, 1.0, 0.0),
            ],
            Material::default(),
        );
        let (arena, id) = arena_with(tri);
        // Hit at p1: the interpolated normal must lean to p1's normal.
        let ray = Ray::new(dvec3(1.9, 0.05, 5.0), dvec3(0.0, 0.0, -1.0));
        let hit = arena.intersect(id, &ray).expect("must hit");
        assert!(hit.normal.x > 0.9);
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let tri = Triangle::new(
            DVec3::ZERO,
            dvec3(1.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            Material::default(),
        );
        let (arena, id) = arena_with(tri);
        let ray = Ray::new(dvec3(0.5, 0.0, 5.0), dvec3(0.0, 0.0, -1.0));
        assert!(arena.intersect(id, &ray).is_none());
    }

    #[test]
    fn test_round_trip_on_plane() {
        let (arena, id) = arena_with(xy_triangle());
        let ray = Ray::new(dvec3(0.2, 0.7, 3.0), dvec3(0.1, -0.05, -1.0));
        if let Some(hit) = arena.intersect(id, &ray) {
            assert!(ray.at(hit.t).z.abs() < 1e-9);
        }
    }
}
