// Re-export glam for convenience
pub use glam::*;

// Facet math types
mod homogeneous;
mod ray;
mod vector;

pub use homogeneous::HomogeneousExt;
pub use ray::Ray;
pub use vector::Vec3Ext;
