//! Facet Core - the inputs the raytracer consumes.
//!
//! This crate provides:
//!
//! - **Geometry**: `Mesh` and `Face`, polygonal meshes with separate
//!   position/normal/UV index lists per face corner
//! - **Surfaces**: `Material`, Blinn-Phong coefficients plus reflectivity
//! - **Configuration**: `RenderParameters`, `Light` and `Projection`,
//!   loadable from JSON
//!
//! # Example
//!
//! ```ignore
//! use facet_core::RenderParameters;
//!
//! let params = RenderParameters::load("params.json")?;
//! println!("{} lights, perspective: {}", params.lights.len(), params.is_perspective());
//! ```

pub mod material;
pub mod mesh;
pub mod params;

// Re-export commonly used types
pub use material::Material;
pub use mesh::{Face, Mesh, MeshError, MeshResult};
pub use params::{ConfigError, ConfigResult, Light, Projection, RenderParameters};
