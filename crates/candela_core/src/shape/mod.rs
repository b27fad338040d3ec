//! Shape protocol, hit records and the shape arena.
//!
//! Every primitive and CSG node implements [`Shape`]. The [`ShapeArena`]
//! exclusively owns all shapes in a scene; anything that needs to refer to
//! another shape (CSG children, hit records) holds a [`ShapeId`] handle into
//! the arena instead of a reference, which keeps composite shapes free of
//! lifetime bookkeeping.

use candela_math::{DVec3, Ray};

use crate::material::{Color, Material};
use crate::modifier::{ModInput, Modifier};

mod csg;
mod cuboid;
mod mesh;
mod plane;
mod quadric;
mod sphere;
mod torus;
mod triangle;

pub use csg::{Bound, CsgIntersection, Merge, Subtract};
pub use cuboid::Cuboid;
pub use mesh::Mesh;
pub use plane::Plane;
pub use quadric::Quadric;
pub use sphere::Sphere;
pub use torus::Torus;
pub use triangle::Triangle;

/// Stable handle to a shape in a [`ShapeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(u32);

impl ShapeId {
    /// Placeholder used while building a hit that a caller will re-stamp.
    pub(crate) const UNSET: ShapeId = ShapeId(u32::MAX);

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Whether the ray enters or leaves the solid at this intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Enter,
    Leave,
}

impl Facing {
    /// Opposite classification, used when a combinator inverts a surface.
    pub fn flipped(self) -> Self {
        match self {
            Facing::Enter => Facing::Leave,
            Facing::Leave => Facing::Enter,
        }
    }
}

/// Record of a ray-shape intersection.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Distance from the ray origin.
    pub t: f64,
    /// Handle of the hit shape (always a leaf primitive, even through CSG).
    pub shape: ShapeId,
    /// World-space intersection point.
    pub point: DVec3,
    /// Surface normal; may be zero until `fill_normal` resolves it.
    pub normal: DVec3,
    /// Integer side-channel for CSG provenance; `tags[0] == 1` marks a hit
    /// contributed by the second operand of a combinator.
    pub tags: [i32; 5],
    /// Enter/leave classification of this intersection.
    pub facing: Facing,
}

impl Hit {
    pub fn new(t: f64, shape: ShapeId, point: DVec3, normal: DVec3) -> Self {
        Self {
            t,
            shape,
            point,
            normal,
            tags: [0; 5],
            facing: Facing::Enter,
        }
    }

    /// Set the enter/leave flag.
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }
}

/// Common capability set of every primitive and CSG node.
///
/// Methods take the owning arena plus the shape's own handle so composite
/// shapes can resolve children and leaves can stamp hits with their id.
pub trait Shape: Send + Sync {
    /// Nearest forward hit beyond the distance threshold, if any.
    fn intersect(&self, arena: &ShapeArena, self_id: ShapeId, ray: &Ray) -> Option<Hit>;

    /// Resolve the normal for primitives that compute it from the world
    /// position. Shapes that set the normal during `intersect` leave this
    /// a no-op.
    fn fill_normal(&self, _hit: &mut Hit) {}

    /// Point-in-solid test, used by CSG combinators. Primitives without a
    /// meaningful interior keep the default and must not be used as CSG
    /// operands.
    fn contains(&self, _arena: &ShapeArena, _point: DVec3) -> bool {
        false
    }

    /// Collect all forward hits along the ray (unordered). Required by CSG;
    /// the default reports none.
    fn all_intersections(
        &self,
        _arena: &ShapeArena,
        _self_id: ShapeId,
        _ray: &Ray,
        _out: &mut Vec<Hit>,
    ) -> usize {
        0
    }

    /// Surface material.
    fn material(&self) -> &Material;

    /// Ordered modifier chain.
    fn modifiers(&self) -> &[Box<dyn Modifier>] {
        &[]
    }

    /// Local shape color: the material diffuse threaded through the
    /// modifier chain in insertion order.
    fn color(&self, hit: &Hit) -> Color {
        let mut kd = self.material().kd;
        for m in self.modifiers() {
            kd = m.apply(&ModInput {
                kd,
                point: hit.point,
                normal: hit.normal,
            });
        }
        kd
    }
}

/// Arena that owns every shape of a scene.
#[derive(Default)]
pub struct ShapeArena {
    shapes: Vec<Box<dyn Shape>>,
}

impl ShapeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a shape and return its handle.
    pub fn insert(&mut self, shape: Box<dyn Shape>) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        self.shapes.push(shape);
        id
    }

    pub fn get(&self, id: ShapeId) -> &dyn Shape {
        self.shapes[id.index()].as_ref()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Intersect the shape behind `id`, stamping hits with that handle.
    pub fn intersect(&self, id: ShapeId, ray: &Ray) -> Option<Hit> {
        self.get(id).intersect(self, id, ray)
    }

    /// All forward hits of the shape behind `id`.
    pub fn all_intersections(&self, id: ShapeId, ray: &Ray, out: &mut Vec<Hit>) -> usize {
        self.get(id).all_intersections(self, id, ray, out)
    }

    /// Point-in-solid test of the shape behind `id`.
    pub fn contains(&self, id: ShapeId, point: DVec3) -> bool {
        self.get(id).contains(self, point)
    }

    /// Resolve the normal of a hit via the shape that produced it.
    pub fn fill_normal(&self, hit: &mut Hit) {
        self.get(hit.shape).fill_normal(hit);
    }

    /// Shape color at a hit, modifier chain applied.
    pub fn color(&self, hit: &Hit) -> Color {
        self.get(hit.shape).color(hit)
    }
}
