//! Triangle-soup mesh primitive.

use candela_math::{DVec3, Ray};
use std::path::Path;

use crate::material::Material;
use crate::mesh_io;
use crate::modifier::Modifier;
use crate::shape::{Hit, Shape, ShapeArena, ShapeId, Triangle};

/// An unordered collection of triangles scanned linearly for the nearest hit.
///
/// The point-in-solid test is ray-cast parity along +Z, which is only
/// correct for closed, watertight meshes; open meshes will report arbitrary
/// membership and must not be used as CSG operands.
pub struct Mesh {
    tris: Vec<Triangle>,
    material: Material,
    mods: Vec<Box<dyn Modifier>>,
}

impl Mesh {
    pub fn new(tris: Vec<Triangle>, material: Material) -> Self {
        Self {
            tris,
            material,
            mods: Vec::new(),
        }
    }

    /// Load a mesh from an OBJ text file.
    ///
    /// With `smooth` set, per-vertex normals accumulated from the faces are
    /// used for shading. A missing or malformed file degrades to an empty
    /// mesh so scene building never aborts.
    pub fn from_obj<P: AsRef<Path>>(path: P, material: Material, smooth: bool) -> Self {
        let path = path.as_ref();
        let tris = match mesh_io::load_obj(path, material, smooth) {
            Ok(tris) => tris,
            Err(err) => {
                log::warn!("failed to load OBJ mesh {}: {}", path.display(), err);
                Vec::new()
            }
        };
        Self::new(tris, material)
    }

    /// Load a mesh from a G3DM binary file; degrades to an empty mesh on
    /// error like [`Mesh::from_obj`].
    pub fn from_ctm<P: AsRef<Path>>(path: P, material: Material) -> Self {
        let path = path.as_ref();
        let tris = match mesh_io::load_ctm(path, material) {
            Ok(tris) => tris,
            Err(err) => {
                log::warn!("failed to load binary mesh {}: {}", path.display(), err);
                Vec::new()
            }
        };
        Self::new(tris, material)
    }

    /// Append a modifier to the color chain.
    pub fn with_modifier(mut self, modifier: Box<dyn Modifier>) -> Self {
        self.mods.push(modifier);
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.tris.len()
    }

    /// Axis-aligned bounds of all vertices, or None for an empty mesh.
    /// Handy for wrapping the mesh in a `Bound` prefilter.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let mut iter = self.tris.iter();
        let first = iter.next()?;
        let (p0, p1, p2) = first.vertices();
        let mut min = p0.min(p1).min(p2);
        let mut max = p0.max(p1).max(p2);
        for tri in iter {
            let (p0, p1, p2) = tri.vertices();
            min = min.min(p0).min(p1).min(p2);
            max = max.max(p0).max(p1).max(p2);
        }
        Some((min, max))
    }
}

impl Shape for Mesh {
    fn intersect(&self, arena: &ShapeArena, self_id: ShapeId, ray: &Ray) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        for tri in &self.tris {
            if let Some(hit) = tri.intersect(arena, self_id, ray) {
                if best.as_ref().map_or(true, |b| hit.t < b.t) {
                    best = Some(hit);
                }
            }
        }
        best
    }

    fn contains(&self, arena: &ShapeArena, point: DVec3) -> bool {
        // Parity ray cast; only meaningful for watertight meshes.
        let probe = Ray::new(point, DVec3::Z);
        let crossings = self
            .tris
            .iter()
            .filter(|tri| tri.intersect(arena, ShapeId::UNSET, &probe).is_some())
            .count();
        crossings % 2 == 1
    }

    fn all_intersections(
        &self,
        arena: &ShapeArena,
        self_id: ShapeId,
        ray: &Ray,
        out: &mut Vec<Hit>,
    ) -> usize {
        let mut n = 0;
        for tri in &self.tris {
            if let Some(hit) = tri.intersect(arena, self_id, ray) {
                out.push(hit);
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

#[cfg(test)]
mod tests {
    use super::*;
    use candela_math::dvec3;

    /// Closed tetrahedron with outward-facing winding.
    fn tetrahedron(material: Material) -> Mesh {
        let a = dvec3(0.0, 0.0, 0.0);
        let b = dvec3(2.0, 0.0, 0.0);
        let c = dvec3(0.0, 2.0, 0.0);
        let d = dvec3(0.0, 0.0, 2.0);
        Mesh::new(
            vec![
                Triangle::new(a, c, b, material),
                Triangle::new(a, b, d, material),
                Triangle::new(a, d, c, material),
                Triangle::new(b, c, d, material),
            ],
            material,
        )
    }

    fn arena_with(mesh: Mesh) -> (ShapeArena, ShapeId) {
        let mut arena = ShapeArena::new();
        let id = arena.insert(Box::new(mesh));
        (arena, id)
    }

    #[test]
    fn test_nearest_triangle_wins() {
        let (arena, id) = arena_with(tetrahedron(Material::default()));
        let ray = Ray::new(dvec3(0.3, 0.3, 10.0), dvec3(0.0, 0.0, -1.0));
        let hit = arena.intersect(id, &ray).expect("must hit");
        // Front face of the tetrahedron, not the base at z = 0.
        assert!(hit.t < 10.0 - 1e-6);
        assert_eq!(hit.shape, id);
    }

    #[test]
    fn test_parity_inside_outside() {
        let (arena, id) = arena_with(tetrahedron(Material::default()));
        assert!(arena.contains(id, dvec3(0.3, 0.3, 0.3)));
        assert!(!arena.contains(id, dvec3(3.0, 3.0, 3.0)));
    }

    #[test]
    fn test_empty_mesh_never_hits() {
        let (arena, id) = arena_with(Mesh::new(Vec::new(), Material::default()));
        let ray = Ray::new(dvec3(0.0, 0.0, 10.0), dvec3(0.0, 0.0, -1.0));
        assert!(arena.intersect(id, &ray).is_none());
        assert!(!arena.contains(id, DVec3::ZERO));
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mesh = Mesh::from_obj("/nonexistent/model.obj", Material::default(), false);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_bounding_box() {
        let mesh = tetrahedron(Material::default());
        let (min, max) = mesh.bounding_box().expect("non-empty");
        assert_eq!(min, DVec3::ZERO);
        assert_eq!(max, dvec3(2.0, 2.0, 2.0));
    }
}
