//! Axis-aligned box primitive.

use candela_math::{dvec3, DVec3, Ray, THRESHOLD};

use crate::material::Material;
use crate::modifier::Modifier;
use crate::shape::{Facing, Hit, Shape, ShapeArena, ShapeId};

const FACE_NORMALS: [DVec3; 6] = [
    DVec3::NEG_X,
    DVec3::X,
    DVec3::NEG_Y,
    DVec3::Y,
    DVec3::NEG_Z,
    DVec3::Z,
];

/// An axis-aligned box spanning `min..max`.
///
/// Intersection is a slab test against the six faces with epsilon-inflated
/// bounds; the nearest valid face hit wins.
pub struct Cuboid {
    min: DVec3,
    max: DVec3,
    material: Material,
    mods: Vec<Box<dyn Modifier>>,
}

impl Cuboid {
    pub fn new(min: DVec3, max: DVec3, material: Material) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            material,
            mods: Vec::new(),
        }
    }

    /// Append a modifier to the color chain.
    pub fn with_modifier(mut self, modifier: Box<dyn Modifier>) -> Self {
        self.mods.push(modifier);
        self
    }

    fn face_points(&self) -> [DVec3; 6] {
        [
            dvec3(self.min.x, 0.0, 0.0),
            dvec3(self.max.x, 0.0, 0.0),
            dvec3(0.0, self.min.y, 0.0),
            dvec3(0.0, self.max.y, 0.0),
            dvec3(0.0, 0.0, self.min.z),
            dvec3(0.0, 0.0, self.max.z),
        ]
    }

    fn within_bounds(&self, p: DVec3) -> bool {
        p.x > self.min.x - THRESHOLD
            && p.x < self.max.x + THRESHOLD
            && p.y > self.min.y - THRESHOLD
            && p.y < self.max.y + THRESHOLD
            && p.z > self.min.z - THRESHOLD
            && p.z < self.max.z + THRESHOLD
    }

    /// Visit every valid forward face hit.
    fn for_each_face_hit(&self, ray: &Ray, mut visit: impl FnMut(f64, DVec3)) {
        let points = self.face_points();
        for (normal, point) in FACE_NORMALS.iter().zip(points) {
            let dp = normal.dot(ray.direction);
            if dp.abs() < THRESHOLD {
                continue;
            }
            let t = normal.dot(point - ray.origin) / dp;
            if t <= THRESHOLD {
                continue;
            }
            if self.within_bounds(ray.at(t)) {
                visit(t, *normal);
            }
        }
    }
}

impl Shape for Cuboid {
    fn intersect(&self, _arena: &ShapeArena, self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        let mut best: Option<(f64, DVec3)> = None;
        self.for_each_face_hit(ray, |t, normal| {
            if best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, normal));
            }
        });
        best.map(|(t, normal)| {
            let facing = if ray.direction.dot(normal) < 0.0 {
                Facing::Enter
            } else {
                Facing::Leave
            };
            Hit::new(t, self_id, ray.at(t), normal).with_facing(facing)
        })
    }

    fn contains(&self, _arena: &ShapeArena, p: DVec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    fn all_intersections(
        &self,
        _arena: &ShapeArena,
        self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        let mut n = 0;
        self.for_each_face_hit(ray, |t, normal| {
            let facing = if ray.direction.dot(normal) < 0.0 {
                Facing::Enter
            } else {
                Facing::Leave
            };
            out.push(Hit::new(t, self_id, ray.at(t), normal).with_facing(facing));
            n += 1;
        });
        n
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

    fn unit_box() -> (ShapeArena, ShapeId) {
        let mut arena = ShapeArena::new();
        let id = arena.insert(Box::new(Cuboid::new(
            dvec3(-1.0, -1.0, -1.0),
            dvec3(1.0, 1.0, 1.0),
            Material::default(),
        )));
        (arena, id)
    }

    #[test]
    fn test_axis_hit_picks_near_face() {
        let (arena, id) = unit_box();
        let ray = Ray::new(dvec3(5.0, 0.0, 0.0), dvec3(-1.0, 0.0, 0.0));
        let hit = arena.intersect(id, &ray).expect("must hit");
        assert!((hit.t - 4.0).abs() < 1e-9);
        assert_eq!(hit.normal, DVec3::X);
        assert_eq!(hit.facing, Facing::Enter);
    }

    #[test]
    fn test_miss_beside_box() {
        let (arena, id) = unit_box();
        let ray = Ray::new(dvec3(5.0, 3.0, 0.0), dvec3(-1.0, 0.0, 0.0));
        assert!(arena.intersect(id, &ray).is_none());
    }

    #[test]
    fn test_hit_from_inside_leaves() {
        let (arena, id) = unit_box();
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);
        let hit = arena.intersect(id, &ray).expect("must hit from inside");
        assert!((hit.t - 1.0).abs() < 1e-9);
        assert_eq!(hit.facing, Facing::Leave);
    }

    #[test]
    fn test_all_intersections_counts_both_faces() {
        let (arena, id) = unit_box();
        let ray = Ray::new(dvec3(5.0, 0.0, 0.0), dvec3(-1.0, 0.0, 0.0));
        let mut hits = Vec::new();
        assert_eq!(arena.all_intersections(id, &ray, &mut hits), 2);
        hits.sort_by(|a, b| a.t.total_cmp(&b.t));
        assert_eq!(hits[0].facing, Facing::Enter);
        assert_eq!(hits[1].facing, Facing::Leave);
    }

    #[test]
    fn test_round_trip_on_face() {
        let (arena, id) = unit_box();
        let ray = Ray::new(dvec3(4.0, 0.3, -0.2), dvec3(-1.0, -0.05, 0.02));
        if let Some(hit) = arena.intersect(id, &ray) {
            let p = ray.at(hit.t);
            // The hit lies on the hit face's plane within epsilon.
            assert!((p.x - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_contains() {
        let (arena, id) = unit_box();
        assert!(arena.contains(id, DVec3::ZERO));
        assert!(!arena.contains(id, dvec3(0.0, 1.5, 0.0)));
    }
}
