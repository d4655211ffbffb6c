//! Facet Renderer - CPU Whitted-style raytracing of polygon meshes.
//!
//! Every render request rebuilds a camera-space triangle soup from the
//! meshes and the current [`RenderParameters`](facet_core::RenderParameters),
//! then sweeps the image rows in parallel. Per pixel it traces one camera ray
//! against every triangle (no acceleration structure) and shades the nearest
//! hit with one of:
//!
//! - flat white
//! - interpolated-normal debug colors
//! - Blinn-Phong, optionally with shadow rays
//! - Blinn-Phong with shadows plus recursive mirror reflections
//!
//! Finished frames are published through a [`RenderSession`], which keeps a
//! complete front buffer readable while the next pass runs.

mod framebuffer;
mod renderer;
mod scene;
mod session;
mod triangle;

pub use framebuffer::{FrameBuffer, CLEAR_PIXEL};
pub use renderer::{
    background_color, calculate_ray, clamp_01, color_to_rgba, is_in_shadow, light_for_ray,
    linear_to_gamma, render, shade_local, shade_pixel, Color, RenderConfig, RenderError,
    RenderResult, DEFAULT_MAX_BOUNCES, GAMMA, SURFACE_EPSILON,
};
pub use scene::{CollisionInfo, Scene, SceneLight};
pub use session::{CancelToken, InFlightPolicy, RenderSession};
pub use triangle::{Triangle, MISS};

/// Re-export common math types from facet_math
pub use facet_math::{Mat4, Ray, Vec2, Vec3, Vec4};
