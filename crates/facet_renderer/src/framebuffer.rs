//! RGBA8 frame buffer written by the renderer.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::renderer::RenderResult;

/// Opaque black, the contents of a fresh buffer.
pub const CLEAR_PIXEL: [u8; 4] = [0, 0, 0, 255];

/// A width × height grid of RGBA8 pixels.
///
/// Row 0 is the bottom of the image, matching the renderer's y axis.
/// [`FrameBuffer::to_image`] flips rows for top-down image formats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    /// Row-major pixels, bottom row first
    pub pixels: Vec<[u8; 4]>,
}

impl FrameBuffer {
    /// Create a buffer cleared to opaque black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![CLEAR_PIXEL; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Pixel at (x, y). Panics if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[self.index(x, y)]
    }

    /// Overwrite pixel (x, y). Panics if out of bounds.
    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.pixels[i] = rgba;
    }

    /// Mutable view of row `y`.
    pub fn row_mut(&mut self, y: u32) -> &mut [[u8; 4]] {
        let start = self.index(0, y);
        &mut self.pixels[start..start + self.width as usize]
    }

    /// Pixels as a flat RGBA byte array, bottom row first.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.pixels.concat()
    }

    /// Convert to a top-down image.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            Rgba(self.get(x, self.height - 1 - y))
        })
    }

    /// Save to disk; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        self.to_image().save(path)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}
