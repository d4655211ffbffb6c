//! Render parameters: the user-adjustable configuration snapshot.
//!
//! The raytracer only ever reads these. A front end owns them, edits them
//! in response to input, and hands a clone to each render request.

use std::path::Path;

use facet_math::{HomogeneousExt, Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading render parameters.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid render parameters: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A point light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Position in object space as a homogeneous point (w=1)
    pub position: Vec4,

    /// Light color (RGB)
    pub color: Vec3,
}

impl Light {
    /// Create a light at a Cartesian position.
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position: Vec4::from_point(position),
            color,
        }
    }
}

/// How camera rays are generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// All rays start at the eye and fan out through the image plane
    #[default]
    Perspective,
    /// Parallel rays along -Z, one per pixel
    Orthographic,
}

/// The configuration snapshot the raytracer reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParameters {
    /// Arcball rotation applied to every mesh
    pub rotation: Mat4,

    /// User translation, added on top of the fixed camera offset of -1 in z
    pub translation: Vec3,

    /// Camera projection mode
    pub projection: Projection,

    /// Debug view coloring each hit by its interpolated normal
    pub interpolation_rendering: bool,

    /// Blinn-Phong lighting
    pub phong_enabled: bool,

    /// Blinn-Phong lighting with shadow rays (takes precedence over `phong_enabled`)
    pub shadows_enabled: bool,

    /// Recursive mirror reflections (implies Phong with shadows)
    pub reflections_enabled: bool,

    /// Lights, in the order their contributions are summed
    pub lights: Vec<Light>,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            rotation: Mat4::IDENTITY,
            translation: Vec3::ZERO,
            projection: Projection::Perspective,
            interpolation_rendering: false,
            phong_enabled: false,
            shadows_enabled: false,
            reflections_enabled: false,
            lights: vec![Light::new(Vec3::new(0.0, 0.0, 1.0), Vec3::ONE)],
        }
    }
}

impl RenderParameters {
    /// Parse render parameters from a JSON string.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load render parameters from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let params = Self::from_json_str(&json)?;

        log::debug!(
            "Loaded render parameters from {:?} ({} lights)",
            path,
            params.lights.len()
        );

        Ok(params)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether the perspective projection is selected.
    pub fn is_perspective(&self) -> bool {
        self.projection == Projection::Perspective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = RenderParameters::default();
        assert_eq!(params.rotation, Mat4::IDENTITY);
        assert!(params.is_perspective());
        assert!(!params.phong_enabled);
        assert_eq!(params.lights.len(), 1);
        assert_eq!(params.lights[0].position.w, 1.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params = RenderParameters::from_json_str(
            r#"{ "projection": "orthographic", "shadows_enabled": true }"#,
        )
        .expect("parameters should parse");

        assert_eq!(params.projection, Projection::Orthographic);
        assert!(params.shadows_enabled);
        assert!(!params.reflections_enabled);
        assert_eq!(params.translation, Vec3::ZERO);
    }

    #[test]
    fn test_lights_from_json() {
        let params = RenderParameters::from_json_str(
            r#"{ "lights": [
                { "position": [1.0, 2.0, 3.0, 1.0], "color": [1.0, 0.5, 0.25] },
                { "position": [0.0, 5.0, 0.0, 1.0], "color": [0.1, 0.1, 0.1] }
            ] }"#,
        )
        .expect("parameters should parse");

        assert_eq!(params.lights.len(), 2);
        assert_eq!(params.lights[0].position, Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(params.lights[0].color, Vec3::new(1.0, 0.5, 0.25));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let result = RenderParameters::from_json_str(r#"{ "projection": "fisheye" }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut params = RenderParameters::default();
        params.translation = Vec3::new(0.1, -0.2, 0.3);
        params.reflections_enabled = true;

        let json = params.to_json_string().expect("serialize");
        let back = RenderParameters::from_json_str(&json).expect("parse");
        assert_eq!(back, params);
    }

    #[test]
    fn test_load_from_file() {
        let _ = env_logger::builder().is_test(true).try_init();

        let path = std::env::temp_dir().join(format!("facet-params-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "phong_enabled": true, "lights": [] }"#).expect("write params");

        let result = RenderParameters::load(&path);
        let _ = std::fs::remove_file(&path);

        let params = result.expect("parameters should load");
        assert!(params.phong_enabled);
        assert!(params.lights.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = RenderParameters::load("/definitely/not/here/params.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
