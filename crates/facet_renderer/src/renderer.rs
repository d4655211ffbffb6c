//! Core raytracing renderer.
//!
//! Implements Whitted-style ray tracing with:
//! - Perspective and orthographic camera rays
//! - Blinn-Phong shading with shadow rays
//! - Recursive mirror reflections with a fixed bounce budget
//! - Gamma correction
//! - Parallel row sweeps using rayon

use std::time::Instant;

use facet_core::{Projection, RenderParameters};
use facet_math::{Ray, Vec3, Vec3Ext};
use rayon::prelude::*;
use thiserror::Error;

use crate::framebuffer::FrameBuffer;
use crate::scene::Scene;
use crate::session::CancelToken;
use crate::triangle::Triangle;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Reflection bounces traced after the primary hit.
pub const DEFAULT_MAX_BOUNCES: u32 = 5;

/// Offset along the surface normal for secondary ray origins, so they do
/// not re-hit the surface they start on.
pub const SURFACE_EPSILON: f32 = 1e-3;

/// Display gamma used for tone mapping.
pub const GAMMA: f32 = 2.2;

/// Errors that can end a render pass.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render was cancelled")]
    Cancelled,

    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to start render thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Render thread panicked")]
    WorkerPanicked,

    #[error("Failed to save image: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Maximum reflection bounce depth
    pub max_bounces: u32,
    /// Worker threads (None = one per hardware thread)
    pub threads: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            max_bounces: DEFAULT_MAX_BOUNCES,
            threads: None,
        }
    }
}

impl RenderConfig {
    /// Set output resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the reflection bounce budget.
    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    /// Use a dedicated pool with this many worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Reject resolutions with no pixels.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Generate the camera ray for pixel (x, y).
///
/// Pixels map to normalized device coordinates in [-1, 1], with row 0 at
/// y = -1. The longer image axis is stretched by the aspect ratio so pixels
/// stay square. Perspective rays start at the eye and pass through
/// (x, y, -1); orthographic rays start at (x, y, 0) and run along -Z.
pub fn calculate_ray(x: u32, y: u32, config: &RenderConfig, projection: Projection) -> Ray {
    let width = config.width as f32;
    let height = config.height as f32;
    let aspect = config.aspect();

    let mut ndc_x = ((x as f32 / width) - 0.5) * 2.0;
    let mut ndc_y = ((y as f32 / height) - 0.5) * 2.0;

    if aspect > 1.0 {
        ndc_x *= aspect;
    } else if aspect < 1.0 {
        ndc_y /= aspect;
    }

    match projection {
        Projection::Perspective => Ray::new(Vec3::ZERO, Vec3::new(ndc_x, ndc_y, -1.0).unit()),
        Projection::Orthographic => Ray::new(Vec3::new(ndc_x, ndc_y, 0.0), Vec3::NEG_Z),
    }
}

/// Check whether `point` is hidden from a light.
///
/// A shadow ray leaves the point, nudged along `normal` by
/// [`SURFACE_EPSILON`], towards the light. The point is in shadow when the
/// ray hits something closer than the light that is not itself a light.
pub fn is_in_shadow(scene: &Scene, point: Vec3, normal: Vec3, light_position: Vec3) -> bool {
    let origin = point + normal * SURFACE_EPSILON;
    let to_light = light_position - origin;
    let light_distance = to_light.length();

    let shadow_ray = Ray::new(origin, to_light.unit());
    match scene.closest_triangle(&shadow_ray).hit() {
        Some((blocker, t)) => t < light_distance && !blocker.material.is_light(),
        None => false,
    }
}

/// Blinn-Phong color at a hit, summed over every light in the scene.
pub fn shade_local(
    scene: &Scene,
    triangle: &Triangle,
    point: Vec3,
    bc: Vec3,
    with_shadows: bool,
) -> Color {
    let normal = triangle.interpolate_normal(bc);

    scene.lights.iter().fold(Color::ZERO, |color, light| {
        let in_shadow = with_shadows && is_in_shadow(scene, point, normal, light.position);
        color + triangle.calculate_phong(light.position, light.color, bc, in_shadow)
    })
}

/// Color seen along a ray, following mirror reflections.
///
/// Returns `None` when the ray hits nothing. A hit is shaded with Phong and
/// shadows; if its material is reflective, the local color is weighted by
/// `1 - reflectivity` and, while `depth > 0`, the reflected ray's color is
/// added weighted by `reflectivity`. With `depth == 0` no further rays are
/// traced, whatever the reflectivity.
pub fn light_for_ray(scene: &Scene, ray: &Ray, depth: u32) -> Option<Color> {
    let (triangle, t) = scene.closest_triangle(ray).hit()?;

    let point = ray.at(t);
    let bc = triangle.barycentric(point);
    let local = shade_local(scene, triangle, point, bc, true);

    let reflectivity = triangle.material.reflectivity;
    if reflectivity <= 0.0 {
        return Some(local);
    }

    let mut color = local * (1.0 - reflectivity);

    if depth > 0 {
        // Offset towards the side the ray came from
        let mut normal = triangle.interpolate_normal(bc);
        if ray.direction.dot(normal) > 0.0 {
            normal = -normal;
        }

        let reflected = Ray::new(
            point + normal * SURFACE_EPSILON,
            ray.direction.reflected(normal).unit(),
        );
        let bounce = light_for_ray(scene, &reflected, depth - 1).unwrap_or(Color::ZERO);
        color += bounce * reflectivity;
    }

    Some(color)
}

/// Background for pixels whose primary ray hits nothing.
///
/// A red/green ramp across the image, so misses stay distinguishable
/// from black geometry.
pub fn background_color(x: u32, y: u32, config: &RenderConfig) -> Color {
    Color::new(
        x as f32 / config.width as f32,
        y as f32 / config.height as f32,
        0.0,
    )
}

/// Linear color of pixel (x, y), before tone mapping.
pub fn shade_pixel(
    scene: &Scene,
    params: &RenderParameters,
    config: &RenderConfig,
    x: u32,
    y: u32,
) -> Color {
    let ray = calculate_ray(x, y, config, params.projection);

    if params.reflections_enabled {
        return light_for_ray(scene, &ray, config.max_bounces)
            .unwrap_or_else(|| background_color(x, y, config));
    }

    let Some((triangle, t)) = scene.closest_triangle(&ray).hit() else {
        return background_color(x, y, config);
    };

    let point = ray.at(t);
    let bc = triangle.barycentric(point);

    let mut color = Color::ONE;

    if params.interpolation_rendering {
        color = triangle.blend_normals(bc).abs();
    }

    if params.shadows_enabled {
        color = shade_local(scene, triangle, point, bc, true);
    } else if params.phong_enabled {
        color = shade_local(scene, triangle, point, bc, false);
    }

    color
}

/// Apply gamma correction (gamma = 2.2).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / GAMMA)
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    // Apply gamma correction and convert to 0-255
    let r = (255.0 * clamp_01(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

/// Render the scene into a new frame buffer.
///
/// Rows are distributed over rayon's work-stealing pool; each worker only
/// writes the row it owns. The scene and parameters are read-only for the
/// whole pass. The cancel token is checked before each row, and a cancelled
/// pass returns [`RenderError::Cancelled`] instead of a partial image.
pub fn render(
    scene: &Scene,
    params: &RenderParameters,
    config: &RenderConfig,
    cancel: &CancelToken,
) -> RenderResult<FrameBuffer> {
    config.validate()?;

    log::info!(
        "Rendering {}x{} ({} triangles, {} lights, {} bounces)",
        config.width,
        config.height,
        scene.len(),
        scene.lights.len(),
        if params.reflections_enabled { config.max_bounces } else { 0 }
    );

    let start = Instant::now();
    let mut frame = FrameBuffer::new(config.width, config.height);

    let sweep = |frame: &mut FrameBuffer| {
        frame
            .pixels
            .par_chunks_mut(config.width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                if cancel.is_cancelled() {
                    return;
                }
                for (x, pixel) in row.iter_mut().enumerate() {
                    let color = shade_pixel(scene, params, config, x as u32, y as u32);
                    *pixel = color_to_rgba(color);
                }
            });
    };

    match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
            pool.install(|| sweep(&mut frame));
        }
        None => sweep(&mut frame),
    }

    if cancel.is_cancelled() {
        log::debug!("Render cancelled after {:?}", start.elapsed());
        return Err(RenderError::Cancelled);
    }

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(frame)
}
