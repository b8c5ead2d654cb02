//! Component background styles
//!
//! A minimal stand-in for the toolkit's style object: only the background
//! properties the renderer needs. Each style carries a process-unique
//! [`StyleId`] and a revision that changes whenever a background property is
//! set, which is what the paint plan cache keys on.

use std::sync::atomic::{AtomicU64, Ordering};

use vela_paint::{Color, Image};

static NEXT_STYLE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a [`Style`] instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleId(u64);

impl StyleId {
    fn next() -> Self {
        StyleId(NEXT_STYLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// How a style paints its background
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackgroundType {
    /// Solid background color (the image, if any, is ignored)
    #[default]
    None,
    /// Image stretched to the component bounds
    ImageScaled,
    /// Image scaled to cover the bounds, centered, overflow clipped
    ImageScaledFill,
    /// Image scaled to fit inside the bounds, centered, color behind it
    ImageScaledFit,
    /// Image repeated in both directions
    ImageTileBoth,
    /// One horizontal band of tiles along the top edge
    ImageTileHorizontalAlignTop,
    ImageTileHorizontalAlignCenter,
    ImageTileHorizontalAlignBottom,
    /// One vertical band of tiles along the left edge
    ImageTileVerticalAlignLeft,
    ImageTileVerticalAlignCenter,
    ImageTileVerticalAlignRight,
    GradientLinearVertical,
    GradientLinearHorizontal,
    GradientRadial,
}

impl BackgroundType {
    pub fn is_gradient(self) -> bool {
        matches!(
            self,
            BackgroundType::GradientLinearVertical
                | BackgroundType::GradientLinearHorizontal
                | BackgroundType::GradientRadial
        )
    }
}

/// Background properties of a component style
#[derive(Debug)]
pub struct Style {
    id: StyleId,
    revision: u64,
    bg_color: Color,
    bg_transparency: u8,
    bg_image: Option<Image>,
    background_type: BackgroundType,
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Style {
    /// A clone is a distinct style with its own identity
    fn clone(&self) -> Self {
        Self {
            id: StyleId::next(),
            revision: 0,
            bg_color: self.bg_color,
            bg_transparency: self.bg_transparency,
            bg_image: self.bg_image.clone(),
            background_type: self.background_type,
        }
    }
}

impl Style {
    /// An opaque white, solid-color style
    pub fn new() -> Self {
        Self {
            id: StyleId::next(),
            revision: 0,
            bg_color: Color::WHITE,
            bg_transparency: 255,
            bg_image: None,
            background_type: BackgroundType::None,
        }
    }

    /// Solid color background
    pub fn solid(color: Color, transparency: u8) -> Self {
        let mut style = Self::new();
        style.bg_color = color;
        style.bg_transparency = transparency;
        style
    }

    /// Image background painted with `background_type`
    pub fn with_image(image: Image, background_type: BackgroundType) -> Self {
        let mut style = Self::new();
        style.bg_image = Some(image);
        style.background_type = background_type;
        style
    }

    pub fn id(&self) -> StyleId {
        self.id
    }

    /// Bumped by every background setter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn bg_color(&self) -> Color {
        self.bg_color
    }

    pub fn bg_transparency(&self) -> u8 {
        self.bg_transparency
    }

    pub fn bg_image(&self) -> Option<&Image> {
        self.bg_image.as_ref()
    }

    pub fn background_type(&self) -> BackgroundType {
        self.background_type
    }

    pub fn set_bg_color(&mut self, color: Color) {
        self.bg_color = color;
        self.revision += 1;
    }

    pub fn set_bg_transparency(&mut self, transparency: u8) {
        self.bg_transparency = transparency;
        self.revision += 1;
    }

    pub fn set_bg_image(&mut self, image: Option<Image>) {
        self.bg_image = image;
        self.revision += 1;
    }

    pub fn set_background_type(&mut self, background_type: BackgroundType) {
        self.background_type = background_type;
        self.revision += 1;
    }
}
