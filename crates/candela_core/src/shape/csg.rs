//! CSG combinators built on the shape capability set.
//!
//! Nodes hold arena handles to their operands and forward the leaf
//! primitive's hit record, so materials and modifiers always resolve on
//! the surface that was actually struck. Every operand must implement
//! `contains` and `all_intersections` consistently; a primitive that
//! leaves the default always-false `contains` silently breaks boolean
//! composition.

use candela_math::{DVec3, Ray};

use crate::material::Material;
use crate::shape::{Hit, Shape, ShapeArena, ShapeId};

/// Tag slot marking a hit that originated on operand B's surface.
const B_SIDE: usize = 0;

fn nearest(hits: Vec<Hit>) -> Option<Hit> {
    hits.into_iter()
        .min_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal))
}

/// Performance prefilter: intersects `inner` only when `bound` is hit.
///
/// Not a boolean operator. Membership and exhaustive intersection queries
/// bypass the bound so the node stays transparent inside CSG trees.
pub struct Bound {
    inner: ShapeId,
    bound: ShapeId,
    material: Material,
}

impl Bound {
    pub fn new(inner: ShapeId, bound: ShapeId) -> Self {
        Self {
            inner,
            bound,
            material: Material::default(),
        }
    }
}

impl Shape for Bound {
    fn intersect(&self, arena: &ShapeArena, _self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        if arena.intersect(self.bound, ray).is_none() && !arena.contains(self.bound, ray.origin) {
            return None;
        }
        arena.intersect(self.inner, ray)
    }

    fn contains(&self, arena: &ShapeArena, point: DVec3) -> bool {
        arena.contains(self.inner, point)
    }

    fn all_intersections(
        &self,
        arena: &ShapeArena,
        _self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        arena.all_intersections(self.inner, ray, out)
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

/// Boolean union: hidden internal surfaces are discarded.
pub struct Merge {
    a: ShapeId,
    b: ShapeId,
    material: Material,
}

impl Merge {
    pub fn new(a: ShapeId, b: ShapeId) -> Self {
        Self {
            a,
            b,
            material: Material::default(),
        }
    }

    fn surface_hits(&self, arena: &ShapeArena, ray: &Ray) -> Vec<Hit> {
        let mut hits = Vec::new();
        arena.all_intersections(self.a, ray, &mut hits);
        let split = hits.len();
        arena.all_intersections(self.b, ray, &mut hits);
        let (a_hits, b_hits) = hits.split_at(split);
        let mut kept: Vec<Hit> = a_hits
            .iter()
            .filter(|h| !arena.contains(self.b, h.point))
            .copied()
            .collect();
        for h in b_hits.iter().filter(|h| !arena.contains(self.a, h.point)) {
            let mut h = *h;
            h.tags[B_SIDE] = 1;
            kept.push(h);
        }
        kept
    }
}

impl Shape for Merge {
    fn intersect(&self, arena: &ShapeArena, _self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        nearest(self.surface_hits(arena, ray))
    }

    fn contains(&self, arena: &ShapeArena, point: DVec3) -> bool {
        arena.contains(self.a, point) || arena.contains(self.b, point)
    }

    fn all_intersections(
        &self,
        arena: &ShapeArena,
        _self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        let hits = self.surface_hits(arena, ray);
        let n = hits.len();
        out.extend(hits);
        n
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

/// Boolean AND: only surface points inside the other operand survive.
pub struct CsgIntersection {
    a: ShapeId,
    b: ShapeId,
    material: Material,
}

impl CsgIntersection {
    pub fn new(a: ShapeId, b: ShapeId) -> Self {
        Self {
            a,
            b,
            material: Material::default(),
        }
    }

    fn surface_hits(&self, arena: &ShapeArena, ray: &Ray) -> Vec<Hit> {
        let mut hits = Vec::new();
        arena.all_intersections(self.a, ray, &mut hits);
        let split = hits.len();
        arena.all_intersections(self.b, ray, &mut hits);
        let (a_hits, b_hits) = hits.split_at(split);
        let mut kept: Vec<Hit> = a_hits
            .iter()
            .filter(|h| arena.contains(self.b, h.point))
            .copied()
            .collect();
        for h in b_hits.iter().filter(|h| arena.contains(self.a, h.point)) {
            let mut h = *h;
            h.tags[B_SIDE] = 1;
            kept.push(h);
        }
        kept
    }
}

impl Shape for CsgIntersection {
    fn intersect(&self, arena: &ShapeArena, _self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        nearest(self.surface_hits(arena, ray))
    }

    fn contains(&self, arena: &ShapeArena, point: DVec3) -> bool {
        arena.contains(self.a, point) && arena.contains(self.b, point)
    }

    fn all_intersections(
        &self,
        arena: &ShapeArena,
        _self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        let hits = self.surface_hits(arena, ray);
        let n = hits.len();
        out.extend(hits);
        n
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

/// Boolean difference, minuend minus subtrahend.
///
/// Surviving subtrahend surfaces bound the carved cavity, so their
/// normals and enter/leave sense are inverted and the hit is tagged.
pub struct Subtract {
    a: ShapeId,
    b: ShapeId,
    material: Material,
}

impl Subtract {
    pub fn new(a: ShapeId, b: ShapeId) -> Self {
        Self {
            a,
            b,
            material: Material::default(),
        }
    }

    fn surface_hits(&self, arena: &ShapeArena, ray: &Ray) -> Vec<Hit> {
        let mut hits = Vec::new();
        arena.all_intersections(self.a, ray, &mut hits);
        let split = hits.len();
        arena.all_intersections(self.b, ray, &mut hits);
        let (a_hits, b_hits) = hits.split_at(split);
        let mut kept: Vec<Hit> = a_hits
            .iter()
            .filter(|h| !arena.contains(self.b, h.point))
            .copied()
            .collect();
        for h in b_hits.iter().filter(|h| arena.contains(self.a, h.point)) {
            let mut h = *h;
            h.normal = -h.normal;
            h.facing = h.facing.flipped();
            h.tags[B_SIDE] = 1;
            kept.push(h);
        }
        kept
    }
}

impl Shape for Subtract {
    fn intersect(&self, arena: &ShapeArena, _self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        nearest(self.surface_hits(arena, ray))
    }

    fn contains(&self, arena: &ShapeArena, point: DVec3) -> bool {
        arena.contains(self.a, point) && !arena.contains(self.b, point)
    }

    fn all_intersections(
        &self,
        arena: &ShapeArena,
        _self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        let hits = self.surface_hits(arena, ray);
        let n = hits.len();
        out.extend(hits);
        n
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Sphere;
    use candela_math::dvec3;

    /// Two unit-radius-2 spheres overlapping on the X axis.
    fn overlapping_spheres(arena: &mut ShapeArena) -> (ShapeId, ShapeId) {
        let a = arena.insert(Box::new(Sphere::new(
            dvec3(-1.0, 0.0, 0.0),
            2.0,
            Material::default(),
        )));
        let b = arena.insert(Box::new(Sphere::new(
            dvec3(1.0, 0.0, 0.0),
            2.0,
            Material::default(),
        )));
        (a, b)
    }

    fn x_ray() -> Ray {
        Ray::new(dvec3(-10.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0))
    }

    #[test]
    fn test_merge_discards_internal_surfaces() {
        let mut arena = ShapeArena::new();
        let (a, b) = overlapping_spheres(&mut arena);
        let id = arena.insert(Box::new(Merge::new(a, b)));

        let mut hits = Vec::new();
        arena.all_intersections(id, &x_ray(), &mut hits);
        assert_eq!(hits.len(), 2);
        for h in &hits {
            assert!(!arena.contains(a, h.point) || !arena.contains(b, h.point));
        }
        // Outermost skins of the union: x = -3 from A, x = 3 from B. Only
        // the B-side skin carries the operand tag.
        let far = hits.iter().find(|h| h.point.x > 0.0).expect("far skin");
        assert!((far.point.x - 3.0).abs() < 1e-9);
        assert_eq!(far.tags[0], 1);
        let hit = arena.intersect(id, &x_ray()).expect("union must be hit");
        assert!((hit.point.x - (-3.0)).abs() < 1e-9);
        assert_eq!(hit.shape, a);
        assert_eq!(hit.tags[0], 0);
    }

    #[test]
    fn test_intersection_keeps_lens_only() {
        let mut arena = ShapeArena::new();
        let (a, b) = overlapping_spheres(&mut arena);
        let id = arena.insert(Box::new(CsgIntersection::new(a, b)));

        // Lens spans x in [-1, 1]; nearest surface is sphere B's near skin.
        let hit = arena.intersect(id, &x_ray()).expect("lens must be hit");
        assert!((hit.point.x - (-1.0)).abs() < 1e-9);
        assert_eq!(hit.shape, b);
        assert_eq!(hit.tags[0], 1);

        // Kept hits sit on one operand's skin and within (or on) the other,
        // so membership is checked with a surface tolerance.
        let mut hits = Vec::new();
        arena.all_intersections(id, &x_ray(), &mut hits);
        assert_eq!(hits.len(), 2);
        for h in &hits {
            assert!((h.point - dvec3(-1.0, 0.0, 0.0)).length() <= 2.0 + 1e-9);
            assert!((h.point - dvec3(1.0, 0.0, 0.0)).length() <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn test_subtract_polarity() {
        let mut arena = ShapeArena::new();
        let (a, b) = overlapping_spheres(&mut arena);
        let id = arena.insert(Box::new(Subtract::new(a, b)));

        // A minus B: the ray enters A's skin at x=-3 and re-enters the
        // carved cavity wall (B's near skin) at x=-1.
        let hit = arena.intersect(id, &x_ray()).expect("difference must be hit");
        assert!((hit.point.x - (-3.0)).abs() < 1e-9);
        assert_eq!(hit.tags[0], 0);

        let mut hits = Vec::new();
        arena.all_intersections(id, &x_ray(), &mut hits);
        assert_eq!(hits.len(), 2);
        let cavity = hits
            .iter()
            .find(|h| h.tags[0] == 1)
            .expect("cavity wall hit");
        assert!((cavity.point.x - (-1.0)).abs() < 1e-9);
        // B's outward normal at x=-1 points toward -X; inversion makes the
        // cavity wall face +X, into the carved-out region.
        assert!(cavity.normal.x > 0.0);
        assert_eq!(cavity.shape, b);
    }

    #[test]
    fn test_subtract_membership() {
        let mut arena = ShapeArena::new();
        let (a, b) = overlapping_spheres(&mut arena);
        let id = arena.insert(Box::new(Subtract::new(a, b)));
        assert!(arena.contains(id, dvec3(-2.0, 0.0, 0.0)));
        assert!(!arena.contains(id, DVec3::ZERO));
        assert!(!arena.contains(id, dvec3(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_bound_gates_intersection_only() {
        let mut arena = ShapeArena::new();
        let inner = arena.insert(Box::new(Sphere::new(
            DVec3::ZERO,
            1.0,
            Material::default(),
        )));
        // Bounding volume displaced away from the inner shape on purpose.
        let bound = arena.insert(Box::new(Sphere::new(
            dvec3(100.0, 0.0, 0.0),
            1.0,
            Material::default(),
        )));
        let id = arena.insert(Box::new(Bound::new(inner, bound)));

        let ray = Ray::new(dvec3(0.0, 0.0, 10.0), dvec3(0.0, 0.0, -1.0));
        assert!(arena.intersect(id, &ray).is_none());
        // Membership ignores the prefilter.
        assert!(arena.contains(id, DVec3::ZERO));
    }

    #[test]
    fn test_bound_passes_through_when_hit() {
        let mut arena = ShapeArena::new();
        let inner = arena.insert(Box::new(Sphere::new(
            DVec3::ZERO,
            1.0,
            Material::default(),
        )));
        let bound = arena.insert(Box::new(Sphere::new(
            DVec3::ZERO,
            2.0,
            Material::default(),
        )));
        let id = arena.insert(Box::new(Bound::new(inner, bound)));

        let ray = Ray::new(dvec3(0.0, 0.0, 10.0), dvec3(0.0, 0.0, -1.0));
        let hit = arena.intersect(id, &ray).expect("must pass through bound");
        assert!((hit.t - 9.0).abs() < 1e-9);
        assert_eq!(hit.shape, inner);
    }
}
