//! Color modifier pipeline.
//!
//! A shape carries an ordered chain of modifiers; each one receives the
//! current diffuse color plus the world-space hit position and normal, and
//! returns a full replacement color. Layered procedural texturing falls out
//! of the ordering alone; there is no blending operator.

use candela_math::DVec3;
use std::path::Path;

use crate::material::Color;

/// Input handed to every modifier in the chain.
#[derive(Debug, Clone, Copy)]
pub struct ModInput {
    /// Diffuse color as produced by the previous stage.
    pub kd: Color,
    /// World-space hit position.
    pub point: DVec3,
    /// Surface normal at the hit.
    pub normal: DVec3,
}

/// A pure color transform applied to a shape's diffuse term.
pub trait Modifier: Send + Sync {
    /// Produce the replacement color for this stage.
    fn apply(&self, input: &ModInput) -> Color;
}

/// Modifier wrapping an arbitrary pure function.
pub struct FuncModifier {
    func: Box<dyn Fn(&ModInput) -> Color + Send + Sync>,
}

impl FuncModifier {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&ModInput) -> Color + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }
}

impl Modifier for FuncModifier {
    fn apply(&self, input: &ModInput) -> Color {
        (self.func)(input)
    }
}

/// World-space tiled texture lookup.
///
/// The source image is collapsed to monochrome (per-pixel channel max) at
/// load time; the XZ position, wrapped over `tile` world units, indexes it.
pub struct TextureModifier {
    luma: Vec<f64>,
    width: u32,
    height: u32,
    tile: f64,
}

impl TextureModifier {
    /// Default tile extent in world units.
    pub const DEFAULT_TILE: f64 = 12.0;

    /// Load a texture from an image file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        let luma = img
            .pixels()
            .map(|p| p.0.iter().copied().max().unwrap_or(0) as f64 / 255.0)
            .collect();
        Ok(Self {
            luma,
            width,
            height,
            tile: Self::DEFAULT_TILE,
        })
    }

    /// Build a texture from raw monochrome values (row-major, 0-1 range).
    pub fn from_luma(width: u32, height: u32, luma: Vec<f64>) -> Self {
        assert_eq!(luma.len(), (width * height) as usize);
        Self {
            luma,
            width,
            height,
            tile: Self::DEFAULT_TILE,
        }
    }

    /// Set the world-space tile extent.
    pub fn with_tile(mut self, tile: f64) -> Self {
        self.tile = tile;
        self
    }
}

impl Modifier for TextureModifier {
    fn apply(&self, input: &ModInput) -> Color {
        let p = input.point / self.tile;
        let u = p.x - p.x.floor();
        let v = p.z - p.z.floor();
        let x = ((u * self.width as f64) as u32).min(self.width - 1);
        let y = ((v * self.height as f64) as u32).min(self.height - 1);
        Color::splat(self.luma[(y * self.width + x) as usize])
    }
}

/// Procedural XY gradient over a fixed 5-unit tile.
pub struct GradientModifier;

impl Modifier for GradientModifier {
    fn apply(&self, input: &ModInput) -> Color {
        let p = input.point / 5.0;
        let gx = p.x - p.x.floor();
        let gy = (p.y + 0.5) - (p.y + 0.5).floor();
        Color::new(gx, gy, 1.0)
    }
}

/// Procedural checkerboard over fixed 3-unit XZ tiles.
pub struct CheckerModifier {
    c1: Color,
    c2: Color,
}

impl CheckerModifier {
    pub fn new(c1: Color, c2: Color) -> Self {
        Self { c1, c2 }
    }
}

impl Modifier for CheckerModifier {
    fn apply(&self, input: &ModInput) -> Color {
        let ix = (input.point.x / 3.0).floor() as i64;
        let iz = (input.point.z / 3.0).floor() as i64;
        if (ix.rem_euclid(2) == 0) != (iz.rem_euclid(2) == 0) {
            self.c1
        } else {
            self.c2
        }
    }
}

/// Debug modifier that visualizes the surface normal as a color.
pub struct NormalModifier;

impl Modifier for NormalModifier {
    fn apply(&self, input: &ModInput) -> Color {
        input.normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_math::dvec3;

    fn input_at(point: DVec3) -> ModInput {
        ModInput {
            kd: Color::ONE,
            point,
            normal: DVec3::Y,
        }
    }

    #[test]
    fn test_func_modifier_replaces_color() {
        let m = FuncModifier::new(|i| i.kd * 0.5);
        let out = m.apply(&input_at(DVec3::ZERO));
        assert_eq!(out, Color::splat(0.5));
    }

    #[test]
    fn test_checker_alternates() {
        let m = CheckerModifier::new(Color::ONE, Color::ZERO);
        let a = m.apply(&input_at(dvec3(1.0, 0.0, 1.0)));
        let b = m.apply(&input_at(dvec3(4.0, 0.0, 1.0)));
        assert_ne!(a, b);
        // Two tile steps land back on the same color.
        let c = m.apply(&input_at(dvec3(7.0, 0.0, 1.0)));
        assert_eq!(a, c);
    }

    #[test]
    fn test_checker_consistent_across_origin() {
        let m = CheckerModifier::new(Color::ONE, Color::ZERO);
        // Cells (-1, 0) and (0, 0) are neighbors and must differ.
        let neg = m.apply(&input_at(dvec3(-1.0, 0.0, 1.0)));
        let pos = m.apply(&input_at(dvec3(1.0, 0.0, 1.0)));
        assert_ne!(neg, pos);
    }

    #[test]
    fn test_normal_modifier_passthrough() {
        let m = NormalModifier;
        assert_eq!(m.apply(&input_at(DVec3::ZERO)), DVec3::Y);
    }

    #[test]
    fn test_texture_tiles_world_space() {
        // 2x1 texture: black, white.
        let m = TextureModifier::from_luma(2, 1, vec![0.0, 1.0]).with_tile(2.0);
        let dark = m.apply(&input_at(dvec3(0.1, 0.0, 0.0)));
        let lit = m.apply(&input_at(dvec3(1.1, 0.0, 0.0)));
        assert_eq!(dark, Color::ZERO);
        assert_eq!(lit, Color::ONE);
        // One full tile later the lookup wraps.
        let wrapped = m.apply(&input_at(dvec3(2.1, 0.0, 0.0)));
        assert_eq!(wrapped, dark);
    }

    #[test]
    fn test_gradient_range() {
        let m = GradientModifier;
        let c = m.apply(&input_at(dvec3(3.7, -1.2, 0.0)));
        assert!((0.0..1.0).contains(&c.x));
        assert!((0.0..1.0).contains(&c.y));
        assert_eq!(c.z, 1.0);
    }
}
