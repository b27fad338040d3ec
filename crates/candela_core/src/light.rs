//! Point light with distance attenuation and soft-shadow jitter.

use candela_math::DVec3;

use crate::material::Color;

/// Result of a shadow query: where the light is seen from, how far away,
/// and what color it contributes.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    /// Unit direction from the shaded point toward the (jittered) light.
    pub direction: DVec3,
    /// Light color.
    pub color: Color,
    /// Distance to the (jittered) light position.
    pub distance: f64,
}

/// Point light source.
#[derive(Debug, Clone)]
pub struct PointLight {
    pub position: DVec3,
    pub color: Color,
    /// Constant, linear and quadratic attenuation coefficients.
    pub atten_const: f64,
    pub atten_linear: f64,
    pub atten_quad: f64,
    /// Softness radius: each shadow query jitters the sampled light position
    /// by a random unit-sphere direction scaled by this radius. Single-sample,
    /// so a non-zero radius shows noise unless the caller accumulates.
    pub softness: f64,
}

impl PointLight {
    /// Create a point light with no falloff and hard shadows.
    pub fn new(position: DVec3, color: Color) -> Self {
        Self {
            position,
            color,
            atten_const: 1.0,
            atten_linear: 0.0,
            atten_quad: 0.0,
            softness: 0.0,
        }
    }

    /// Set the attenuation coefficients.
    pub fn with_attenuation(mut self, constant: f64, linear: f64, quadratic: f64) -> Self {
        self.atten_const = constant;
        self.atten_linear = linear;
        self.atten_quad = quadratic;
        self
    }

    /// Set the soft-shadow jitter radius.
    pub fn with_softness(mut self, softness: f64) -> Self {
        self.softness = softness;
        self
    }

    /// Query the light as seen from `point`.
    ///
    /// Returns the sample plus the raw attenuation factor
    /// `1 / (Cc + Cl*d + Cq*d^2)`; the caller clamps it to [0, 1].
    pub fn shadow(&self, point: DVec3) -> (LightSample, f64) {
        let jittered = point + random_unit_vector() * self.softness;
        let to_light = self.position - jittered;
        let distance = to_light.length();
        let sample = LightSample {
            direction: to_light.normalize_or_zero(),
            color: self.color,
            distance,
        };
        let atten = 1.0
            / (self.atten_const + self.atten_linear * distance + self.atten_quad * distance * distance);
        (sample, atten)
    }
}

/// Generate a random unit vector on the unit sphere.
fn random_unit_vector() -> DVec3 {
    // Use rejection sampling for uniform distribution on sphere
    loop {
        let v = DVec3::new(
            rand::random::<f64>() * 2.0 - 1.0,
            rand::random::<f64>() * 2.0 - 1.0,
            rand::random::<f64>() * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}
