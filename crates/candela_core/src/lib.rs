//! Candela core - shapes, CSG, materials and recursive shading.
//!
//! This crate provides:
//!
//! - **Shape protocol**: the [`Shape`] trait, the [`ShapeArena`] that owns
//!   every shape, and [`Hit`] records stamped with arena handles
//! - **Primitives**: sphere, plane, box, quadric, torus, triangle, mesh
//! - **CSG combinators**: bounding prefilter, union, intersection, subtraction
//! - **Material & modifier pipeline**: Phong-style coefficients plus an
//!   ordered chain of procedural color transforms
//! - **Scene**: nearest-hit search and the recursive trace/shade algorithm
//! - **Mesh ingestion**: OBJ text and G3DM binary triangle soups
//!
//! # Example
//!
//! ```
//! use candela_core::{CancelToken, Material, Scene, Sphere};
//! use candela_math::{dvec3, Ray};
//!
//! let mut scene = Scene::new();
//! scene.add(Box::new(Sphere::new(dvec3(0.0, 0.0, 0.0), 5.0, Material::default())));
//!
//! let ray = Ray::new(dvec3(0.0, 0.0, 10.0), dvec3(0.0, 0.0, -1.0));
//! let color = scene.trace(&ray, 0, &CancelToken::new());
//! assert_ne!(color, scene.background);
//! ```

mod cancel;
mod light;
mod material;
pub mod mesh_io;
mod modifier;
mod scene;
pub mod shape;

pub use cancel::CancelToken;
pub use light::{LightSample, PointLight};
pub use material::{Color, Material};
pub use modifier::{
    CheckerModifier, FuncModifier, GradientModifier, ModInput, Modifier, NormalModifier,
    TextureModifier,
};
pub use scene::Scene;
pub use shape::{
    Bound, CsgIntersection, Cuboid, Facing, Hit, Merge, Mesh, Plane, Quadric, Shape, ShapeArena,
    ShapeId, Sphere, Subtract, Torus, Triangle,
};
