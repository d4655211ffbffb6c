//! Blinn-Phong surface description.
//!
//! Materials are immutable once built and shared between every triangle
//! that references them through `Arc<Material>`.

use facet_math::Vec3;
use serde::{Deserialize, Deserializer, Serialize};

/// Reflectance coefficients for the Blinn-Phong model plus a mirror term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Material name (for logs and debugging)
    pub name: String,

    /// Ambient reflectance (RGB, 0-1)
    pub ambient: Vec3,

    /// Diffuse reflectance (RGB, 0-1)
    pub diffuse: Vec3,

    /// Specular reflectance (RGB, 0-1)
    pub specular: Vec3,

    /// Emitted color, added regardless of lighting
    pub emissive: Vec3,

    /// Specular exponent (>= 0)
    #[serde(deserialize_with = "non_negative")]
    pub shininess: f32,

    /// Fraction of the final color taken from the mirror bounce (0-1)
    #[serde(deserialize_with = "unit_interval")]
    pub reflectivity: f32,
}

/// Applies the same bound as [`Material::new`] to deserialized values.
fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    Ok(f32::deserialize(deserializer)?.max(0.0))
}

/// Applies the same bound as [`Material::with_reflectivity`] to deserialized values.
fn unit_interval<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    Ok(f32::deserialize(deserializer)?.clamp(0.0, 1.0))
}

impl Default for Material {
    /// The fallback used for meshes that carry no material: 0.5 grey
    /// ambient/diffuse/specular, no emission, shininess 1, not reflective.
    fn default() -> Self {
        Self {
            name: String::from("default"),
            ambient: Vec3::splat(0.5),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::splat(0.5),
            emissive: Vec3::ZERO,
            shininess: 1.0,
            reflectivity: 0.0,
        }
    }
}

impl Material {
    /// Create a material from its Blinn-Phong coefficients.
    pub fn new(
        name: impl Into<String>,
        ambient: Vec3,
        diffuse: Vec3,
        specular: Vec3,
        emissive: Vec3,
        shininess: f32,
    ) -> Self {
        Self {
            name: name.into(),
            ambient,
            diffuse,
            specular,
            emissive,
            shininess: shininess.max(0.0),
            reflectivity: 0.0,
        }
    }

    /// A pure emitter, used for geometry that stands in for a light.
    pub fn light(name: impl Into<String>, emissive: Vec3) -> Self {
        Self {
            name: name.into(),
            ambient: Vec3::ZERO,
            diffuse: Vec3::ZERO,
            specular: Vec3::ZERO,
            emissive,
            shininess: 1.0,
            reflectivity: 0.0,
        }
    }

    /// Set the mirror term, clamped to [0, 1].
    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity.clamp(0.0, 1.0);
        self
    }

    /// Check if this material emits light.
    ///
    /// Emitters never cast shadows, so the quad that represents a light in
    /// the scene does not darken the surfaces it illuminates.
    pub fn is_light(&self) -> bool {
        self.emissive.length_squared() > 0.0
    }

    /// Check if this material contributes a mirror bounce.
    pub fn is_reflective(&self) -> bool {
        self.reflectivity > 0.0
    }
}
