//! Phong-style surface material.

use candela_math::{dvec3, DVec3};

/// Color type alias (RGB values typically 0-1, unclamped until pixel write).
pub type Color = DVec3;

/// Empirical Phong-style material coefficients.
///
/// Each `k*` coefficient is a per-channel color weight; `phong` is the
/// specular exponent, `refraction` the refractive index used for Snell's
/// law, `roughness` a matte factor reserved for normal perturbation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient coefficient.
    pub ka: Color,
    /// Diffuse coefficient (base of the modifier pipeline).
    pub kd: Color,
    /// Specular coefficient.
    pub ks: Color,
    /// Reflection coefficient; zero disables the recursive reflect ray.
    pub kr: Color,
    /// Transmission coefficient; zero disables the recursive refract ray.
    pub kt: Color,
    /// Phong shininess exponent.
    pub phong: f64,
    /// Refractive index of the material interior.
    pub refraction: f64,
    /// Surface roughness scalar.
    pub roughness: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ka: DVec3::ZERO,
            kd: dvec3(0.0, 0.7, 0.7),
            ks: DVec3::splat(0.5),
            kr: DVec3::splat(0.5),
            kt: DVec3::ZERO,
            phong: 90.0,
            refraction: 1.1,
            roughness: 0.0,
        }
    }
}

impl Material {
    /// Create a plain diffuse material.
    pub fn diffuse(kd: Color) -> Self {
        Self {
            kd,
            ks: DVec3::ZERO,
            kr: DVec3::ZERO,
            ..Self::default()
        }
    }

    /// Create a perfect mirror.
    pub fn mirror() -> Self {
        Self {
            kd: DVec3::ZERO,
            ks: DVec3::ZERO,
            kr: DVec3::ONE,
            kt: DVec3::ZERO,
            ..Self::default()
        }
    }

    /// Create a transparent material with the given refractive index.
    pub fn glass(refraction: f64) -> Self {
        Self {
            kd: DVec3::ZERO,
            kr: DVec3::splat(0.1),
            kt: DVec3::splat(0.9),
            refraction,
            ..Self::default()
        }
    }

    /// Set the ambient coefficient.
    pub fn with_ambient(mut self, ka: Color) -> Self {
        self.ka = ka;
        self
    }

    /// Set the specular coefficient and shininess.
    pub fn with_specular(mut self, ks: Color, phong: f64) -> Self {
        self.ks = ks;
        self.phong = phong;
        self
    }

    /// Set the reflection coefficient.
    pub fn with_reflection(mut self, kr: Color) -> Self {
        self.kr = kr;
        self
    }

    /// Set the transmission coefficient.
    pub fn with_transmission(mut self, kt: Color) -> Self {
        self.kt = kt;
        self
    }
}
