//! Image, raw pixel and font handles
//!
//! These are opaque, cheaply cloneable handles. Decoding images and shaping
//! text belong to other crates; the rendering bridge only needs to carry the
//! handles from the recording thread to the replay thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// An immutable, decoded ARGB image shared between threads
#[derive(Clone, Debug)]
pub struct Image {
    id: u64,
    width: u32,
    height: u32,
    pixels: Arc<[u32]>,
}

impl Image {
    /// Wrap decoded ARGB pixels (row-major, `width * height` entries)
    pub fn from_argb(width: u32, height: u32, pixels: impl Into<Arc<[u32]>>) -> Self {
        let pixels = pixels.into();
        debug_assert_eq!(pixels.len(), pixel_count(width, height));
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            pixels,
        }
    }

    /// A single-color image, mostly useful for tests and placeholders
    pub fn solid(width: u32, height: u32, argb: u32) -> Self {
        Self::from_argb(width, height, vec![argb; pixel_count(width, height)])
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// A window into a raw ARGB buffer drawn with `draw_rgb`
#[derive(Clone, Debug, PartialEq)]
pub struct RgbData {
    pub pixels: Arc<[u32]>,
    /// Index of the first pixel of the window
    pub offset: usize,
    pub width: u32,
    pub height: u32,
    /// Whether the high byte of each pixel is honoured as alpha
    pub process_alpha: bool,
}

impl RgbData {
    pub fn new(pixels: impl Into<Arc<[u32]>>, width: u32, height: u32) -> Self {
        Self {
            pixels: pixels.into(),
            offset: 0,
            width,
            height,
            process_alpha: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// A font selection. Glyph shaping happens in the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub family: Arc<str>,
    pub size: f32,
    pub weight: FontWeight,
    pub italic: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: Arc::from("sans-serif"),
            size: 14.0,
            weight: FontWeight::Regular,
            italic: false,
        }
    }
}

impl Font {
    pub fn new(family: &str, size: f32) -> Self {
        Self {
            family: Arc::from(family),
            size,
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }
}
