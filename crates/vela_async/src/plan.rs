//! Cached background paint plans
//!
//! Classifying a style's background (which mode, which image, which fill
//! color) is done once per style revision. The resulting
//! [`BackgroundRenderer`] is wrapped in a [`CachedPaintPlan`] together with
//! two geometry slots:
//!
//! - **pending**: written by the UI thread every time the background is
//!   recorded for the next frame;
//! - **committed**: copied from pending when the frame is handed to the
//!   consumer (the command's `prepare` hook) and the only slot replay reads.
//!
//! The plan itself is never locked. Commit runs inside the queue swap, which
//! only happens once the previous frame finished replaying, so the consumer
//! never reads committed geometry while it is being written. The slots are
//! atomics purely so the type is `Sync`; the handoff mutex orders the accesses,
//! which is why relaxed loads and stores are enough.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use vela_paint::{Color, Image, Rect, Surface};

use crate::error::PlanError;
use crate::style::{BackgroundType, Style, StyleId};

/// Where a background is painted and how
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlanGeometry {
    /// Component bounds
    pub rect: Rect,
    /// Clip in effect when the background was recorded
    pub clip: Rect,
    /// Paint alpha in effect when the background was recorded
    pub alpha: u8,
}

#[derive(Debug, Default)]
struct AtomicGeometry {
    x: AtomicU32,
    y: AtomicU32,
    width: AtomicU32,
    height: AtomicU32,
    clip_x: AtomicU32,
    clip_y: AtomicU32,
    clip_width: AtomicU32,
    clip_height: AtomicU32,
    alpha: AtomicU8,
}

impl AtomicGeometry {
    fn new(geometry: PlanGeometry) -> Self {
        let slot = Self::default();
        slot.store(geometry);
        slot
    }

    fn load(&self) -> PlanGeometry {
        let f = |v: &AtomicU32| f32::from_bits(v.load(Ordering::Relaxed));
        PlanGeometry {
            rect: Rect::new(f(&self.x), f(&self.y), f(&self.width), f(&self.height)),
            clip: Rect::new(
                f(&self.clip_x),
                f(&self.clip_y),
                f(&self.clip_width),
                f(&self.clip_height),
            ),
            alpha: self.alpha.load(Ordering::Relaxed),
        }
    }

    fn store(&self, geometry: PlanGeometry) {
        let s = |slot: &AtomicU32, v: f32| slot.store(v.to_bits(), Ordering::Relaxed);
        s(&self.x, geometry.rect.x);
        s(&self.y, geometry.rect.y);
        s(&self.width, geometry.rect.width);
        s(&self.height, geometry.rect.height);
        s(&self.clip_x, geometry.clip.x);
        s(&self.clip_y, geometry.clip.y);
        s(&self.clip_width, geometry.clip.width);
        s(&self.clip_height, geometry.clip.height);
        self.alpha.store(geometry.alpha, Ordering::Relaxed);
    }
}

/// Which edge a single band of tiles hugs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileAlign {
    HorizontalTop,
    HorizontalCenter,
    HorizontalBottom,
    VerticalLeft,
    VerticalCenter,
    VerticalRight,
}

impl TileAlign {
    /// Band of `rect` covered by tiles of an `image_width` x `image_height` image
    pub fn band(self, rect: Rect, image_width: f32, image_height: f32) -> Rect {
        let Rect {
            x,
            y,
            width,
            height,
        } = rect;
        match self {
            TileAlign::HorizontalTop => Rect::new(x, y, width, image_height.min(height)),
            TileAlign::HorizontalCenter => Rect::new(
                x,
                y + (height / 2.0).trunc() - (image_height / 2.0).trunc(),
                width,
                image_height,
            ),
            TileAlign::HorizontalBottom => {
                Rect::new(x, y + (height - image_height), width, image_height)
            }
            TileAlign::VerticalLeft => Rect::new(x, y, image_width, height),
            TileAlign::VerticalCenter => Rect::new(
                x + (width / 2.0).trunc() - (image_width / 2.0).trunc(),
                y,
                image_width,
                height,
            ),
            TileAlign::VerticalRight => Rect::new(x + width - image_width, y, image_width, height),
        }
    }
}

/// A classified background, ready to paint at any geometry
#[derive(Clone, Debug)]
pub enum BackgroundRenderer {
    Solid {
        color: Color,
        transparency: u8,
    },
    ImageScaled {
        image: Image,
    },
    ImageScaledFill {
        image: Image,
    },
    ImageScaledFit {
        image: Image,
        color: Color,
        transparency: u8,
    },
    TileBoth {
        image: Image,
    },
    TileBand {
        image: Image,
        align: TileAlign,
        color: Color,
        transparency: u8,
    },
}

impl BackgroundRenderer {
    /// Classify a style's background mode
    pub fn classify(style: &Style) -> Result<Self, PlanError> {
        let solid = || {
            if style.bg_transparency() == 0 {
                Err(PlanError::Transparent)
            } else {
                Ok(BackgroundRenderer::Solid {
                    color: style.bg_color(),
                    transparency: style.bg_transparency(),
                })
            }
        };

        let background_type = style.background_type();
        let Some(image) = style.bg_image().cloned() else {
            if background_type.is_gradient() {
                return Err(PlanError::UnsupportedBackground(background_type));
            }
            return solid();
        };

        let band = |align| BackgroundRenderer::TileBand {
            image: image.clone(),
            align,
            color: style.bg_color(),
            transparency: style.bg_transparency(),
        };

        match background_type {
            BackgroundType::None => solid(),
            BackgroundType::ImageScaled => Ok(BackgroundRenderer::ImageScaled { image }),
            BackgroundType::ImageScaledFill => Ok(BackgroundRenderer::ImageScaledFill { image }),
            BackgroundType::ImageScaledFit => Ok(BackgroundRenderer::ImageScaledFit {
                color: style.bg_color(),
                transparency: style.bg_transparency(),
                image,
            }),
            BackgroundType::ImageTileBoth => Ok(BackgroundRenderer::TileBoth { image }),
            BackgroundType::ImageTileHorizontalAlignTop => Ok(band(TileAlign::HorizontalTop)),
            BackgroundType::ImageTileHorizontalAlignCenter => {
                Ok(band(TileAlign::HorizontalCenter))
            }
            BackgroundType::ImageTileHorizontalAlignBottom => {
                Ok(band(TileAlign::HorizontalBottom))
            }
            BackgroundType::ImageTileVerticalAlignLeft => Ok(band(TileAlign::VerticalLeft)),
            BackgroundType::ImageTileVerticalAlignCenter => Ok(band(TileAlign::VerticalCenter)),
            BackgroundType::ImageTileVerticalAlignRight => Ok(band(TileAlign::VerticalRight)),
            BackgroundType::GradientLinearVertical
            | BackgroundType::GradientLinearHorizontal
            | BackgroundType::GradientRadial => {
                Err(PlanError::UnsupportedBackground(background_type))
            }
        }
    }

    /// Paint at `geometry`. The caller has already applied the clip.
    pub fn render(&self, surface: &mut dyn Surface, geometry: &PlanGeometry) {
        let rect = geometry.rect;
        let alpha = geometry.alpha;
        match self {
            BackgroundRenderer::Solid {
                color,
                transparency,
            } => fill_solid(surface, rect, *color, *transparency, alpha),
            BackgroundRenderer::ImageScaled { image } => {
                surface.set_alpha(alpha);
                surface.draw_image_region(image, image_bounds(image), rect);
            }
            BackgroundRenderer::ImageScaledFill { image } => {
                let (iw, ih) = (image.width() as f32, image.height() as f32);
                let ratio = (rect.width / iw).max(rect.height / ih);
                surface.set_alpha(alpha);
                surface.draw_image_region(image, image_bounds(image), centered(rect, iw, ih, ratio));
            }
            BackgroundRenderer::ImageScaledFit {
                image,
                color,
                transparency,
            } => {
                fill_solid(surface, rect, *color, *transparency, alpha);
                let (iw, ih) = (image.width() as f32, image.height() as f32);
                let ratio = (rect.width / iw).min(rect.height / ih);
                surface.set_alpha(alpha);
                surface.draw_image_region(image, image_bounds(image), centered(rect, iw, ih, ratio));
            }
            BackgroundRenderer::TileBoth { image } => {
                surface.set_alpha(alpha);
                tile(surface, image, rect);
            }
            BackgroundRenderer::TileBand {
                image,
                align,
                color,
                transparency,
            } => {
                fill_solid(surface, rect, *color, *transparency, alpha);
                let band = align.band(rect, image.width() as f32, image.height() as f32);
                surface.set_alpha(alpha);
                tile(surface, image, band);
            }
        }
    }
}

fn image_bounds(image: &Image) -> Rect {
    Rect::from_size(image.width() as f32, image.height() as f32)
}

/// `iw` x `ih` scaled by `ratio` and centered in `rect`
fn centered(rect: Rect, iw: f32, ih: f32, ratio: f32) -> Rect {
    let width = (iw * ratio).trunc();
    let height = (ih * ratio).trunc();
    Rect::new(
        rect.x + ((rect.width - width) / 2.0).trunc(),
        rect.y + ((rect.height - height) / 2.0).trunc(),
        width,
        height,
    )
}

fn fill_solid(surface: &mut dyn Surface, rect: Rect, color: Color, transparency: u8, alpha: u8) {
    if transparency == 0 {
        return;
    }
    surface.set_color(color);
    surface.set_alpha(combine_alpha(transparency, alpha));
    surface.fill_rect(rect);
}

/// Tiles anchored at the band origin rather than the surface origin
fn tile(surface: &mut dyn Surface, image: &Image, band: Rect) {
    surface.save();
    surface.translate(band.x, band.y);
    surface.tile_image(image, Rect::from_size(band.width, band.height));
    surface.restore();
}

fn combine_alpha(a: u8, b: u8) -> u8 {
    ((u16::from(a) * u16::from(b) + 127) / 255) as u8
}

/// A style's background renderer plus its double-buffered geometry
#[derive(Debug)]
pub struct CachedPaintPlan {
    style_id: StyleId,
    renderer: Arc<BackgroundRenderer>,
    pending: AtomicGeometry,
    committed: AtomicGeometry,
}

impl CachedPaintPlan {
    pub fn new(style: &Style) -> Result<Self, PlanError> {
        let renderer = BackgroundRenderer::classify(style)?;
        Ok(Self {
            style_id: style.id(),
            renderer: Arc::new(renderer),
            pending: AtomicGeometry::default(),
            committed: AtomicGeometry::new(PlanGeometry::default()),
        })
    }

    pub fn style_id(&self) -> StyleId {
        self.style_id
    }

    pub fn renderer(&self) -> &Arc<BackgroundRenderer> {
        &self.renderer
    }

    /// Set next frame's geometry (producer side)
    pub fn record(&self, geometry: PlanGeometry) {
        self.pending.store(geometry);
    }

    pub fn pending(&self) -> PlanGeometry {
        self.pending.load()
    }

    /// Publish pending geometry to the consumer. Runs at swap time.
    pub fn commit(&self) -> PlanGeometry {
        let geometry = self.pending.load();
        self.committed.store(geometry);
        geometry
    }

    pub fn committed(&self) -> PlanGeometry {
        self.committed.load()
    }

    /// Paint the committed geometry (consumer side)
    pub fn render(&self, surface: &mut dyn Surface) {
        self.renderer.render(surface, &self.committed.load());
    }
}

/// How the context should record a background this frame
#[derive(Debug, Clone)]
pub enum PlanUse {
    /// First use this frame: write the plan's pending slot and queue the plan
    Shared(Arc<CachedPaintPlan>),
    /// The plan is already queued in this frame. Its pending slot belongs to
    /// that earlier entry, so this use must capture geometry by value.
    AlreadyQueued(Arc<BackgroundRenderer>),
}

#[derive(Debug)]
struct PlanEntry {
    revision: u64,
    plan: Result<Arc<CachedPaintPlan>, PlanError>,
    /// Last producer frame the style was painted in
    last_frame: Option<u64>,
}

/// Producer-side table of plans keyed by style identity
#[derive(Debug, Default)]
pub struct PlanCache {
    entries: FxHashMap<StyleId, PlanEntry>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan for `style` in producer frame `frame`, building it on first use or
    /// after the style changed. Classification failures are cached too, so an
    /// unsupported style is not re-examined every frame.
    pub fn plan_for(&mut self, style: &Style, frame: u64) -> Result<PlanUse, PlanError> {
        let entry = self
            .entries
            .entry(style.id())
            .and_modify(|entry| {
                if entry.revision != style.revision() {
                    tracing::trace!(style = style.id().to_raw(), "style changed, rebuilding paint plan");
                    *entry = PlanEntry {
                        revision: style.revision(),
                        plan: CachedPaintPlan::new(style).map(Arc::new),
                        last_frame: None,
                    };
                }
            })
            .or_insert_with(|| PlanEntry {
                revision: style.revision(),
                plan: CachedPaintPlan::new(style).map(Arc::new),
                last_frame: None,
            });

        let already_queued = entry.last_frame == Some(frame);
        entry.last_frame = Some(frame);
        let plan = entry.plan.as_ref().map_err(|err| *err)?;
        if already_queued {
            return Ok(PlanUse::AlreadyQueued(Arc::clone(plan.renderer())));
        }
        Ok(PlanUse::Shared(Arc::clone(plan)))
    }

    /// Drop entries whose style was not painted in the last `idle_frames`
    /// frames before `frame`. Returns how many were dropped.
    ///
    /// Styles are not tracked for liveness, so this sweep is what bounds the
    /// table when styles come and go. A swept style that is painted again
    /// simply gets a fresh plan.
    pub fn evict_idle(&mut self, frame: u64, idle_frames: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry
                .last_frame
                .is_some_and(|last| frame.saturating_sub(last) <= idle_frames)
        });
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every plan; queued commands keep their own references
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_paint::{RecordingSurface, SurfaceOp};

    fn geometry(x: f32) -> PlanGeometry {
        PlanGeometry {
            rect: Rect::new(x, 0.0, 100.0, 40.0),
            clip: Rect::from_size(320.0, 480.0),
            alpha: 255,
        }
    }

    #[test]
    fn test_classify_solid_and_transparent() {
        let style = Style::solid(Color::RED, 200);
        assert!(matches!(
            BackgroundRenderer::classify(&style),
            Ok(BackgroundRenderer::Solid {
                transparency: 200,
                ..
            })
        ));

        let clear = Style::solid(Color::RED, 0);
        assert_eq!(
            BackgroundRenderer::classify(&clear).unwrap_err(),
            PlanError::Transparent
        );
    }

    #[test]
    fn test_classify_gradient_is_unsupported() {
        let mut style = Style::new();
        style.set_background_type(BackgroundType::GradientRadial);
        assert_eq!(
            BackgroundRenderer::classify(&style).unwrap_err(),
            PlanError::UnsupportedBackground(BackgroundType::GradientRadial)
        );
    }

    #[test]
    fn test_image_with_none_type_paints_color() {
        let style = Style::with_image(Image::solid(4, 4, 0), BackgroundType::None);
        assert!(matches!(
            BackgroundRenderer::classify(&style),
            Ok(BackgroundRenderer::Solid { .. })
        ));
    }

    #[test]
    fn test_replay_reads_committed_not_pending() {
        let plan = CachedPaintPlan::new(&Style::solid(Color::BLUE, 255)).unwrap();
        plan.record(geometry(0.0));
        plan.commit();
        plan.record(geometry(50.0));

        let mut surface = RecordingSurface::new(320, 480);
        plan.render(&mut surface);
        assert_eq!(
            surface.calls()[0].op,
            SurfaceOp::FillRect(Rect::new(0.0, 0.0, 100.0, 40.0))
        );
        assert_eq!(plan.pending().rect.x, 50.0);
    }

    #[test]
    fn test_scaled_fill_covers_and_centers() {
        let image = Image::solid(10, 20, 0);
        let style = Style::with_image(image.clone(), BackgroundType::ImageScaledFill);
        let renderer = BackgroundRenderer::classify(&style).unwrap();

        let mut surface = RecordingSurface::new(100, 100);
        renderer.render(&mut surface, &geometry(0.0));
        // cover 100x40 with a 1:2 image: 100x200, centered vertically
        assert_eq!(
            surface.calls()[0].op,
            SurfaceOp::DrawImageRegion {
                image_id: image.id(),
                src: Rect::from_size(10.0, 20.0),
                dest: Rect::new(0.0, -80.0, 100.0, 200.0),
            }
        );
    }

    #[test]
    fn test_scaled_fit_fills_color_then_contains_image() {
        let image = Image::solid(10, 20, 0);
        let mut style = Style::with_image(image.clone(), BackgroundType::ImageScaledFit);
        style.set_bg_color(Color::GREEN);

        let renderer = BackgroundRenderer::classify(&style).unwrap();
        let mut surface = RecordingSurface::new(100, 100);
        renderer.render(&mut surface, &geometry(0.0));

        let calls = surface.calls();
        assert_eq!(calls[0].op, SurfaceOp::FillRect(Rect::new(0.0, 0.0, 100.0, 40.0)));
        assert_eq!(calls[0].color, Color::GREEN);
        assert_eq!(
            calls[1].op,
            SurfaceOp::DrawImageRegion {
                image_id: image.id(),
                src: Rect::from_size(10.0, 20.0),
                dest: Rect::new(40.0, 0.0, 20.0, 40.0),
            }
        );
    }

    #[test]
    fn test_tile_band_alignment() {
        let rect = Rect::new(10.0, 10.0, 100.0, 60.0);
        assert_eq!(
            TileAlign::HorizontalBottom.band(rect, 8.0, 16.0),
            Rect::new(10.0, 54.0, 100.0, 16.0)
        );
        assert_eq!(
            TileAlign::VerticalCenter.band(rect, 8.0, 16.0),
            Rect::new(56.0, 10.0, 8.0, 60.0)
        );
        assert_eq!(
            TileAlign::HorizontalTop.band(rect, 8.0, 100.0),
            Rect::new(10.0, 10.0, 100.0, 60.0)
        );
    }

    #[test]
    fn test_centered_bands_halve_each_side_separately() {
        // 60/2 - 15/2 = 30 - 7
        assert_eq!(
            TileAlign::HorizontalCenter.band(Rect::new(0.0, 0.0, 100.0, 60.0), 8.0, 15.0),
            Rect::new(0.0, 23.0, 100.0, 15.0)
        );
        assert_eq!(
            TileAlign::VerticalCenter.band(Rect::new(5.0, 0.0, 60.0, 40.0), 15.0, 8.0),
            Rect::new(28.0, 0.0, 15.0, 40.0)
        );
    }

    #[test]
    fn test_tiles_are_anchored_at_band_origin() {
        let image = Image::solid(8, 8, 0);
        let renderer =
            BackgroundRenderer::classify(&Style::with_image(image, BackgroundType::ImageTileBoth))
                .unwrap();
        let mut surface = RecordingSurface::new(200, 200);
        renderer.render(&mut surface, &geometry(30.0));

        let ops: Vec<_> = surface.calls().iter().map(|c| c.op.clone()).collect();
        assert_eq!(ops[0], SurfaceOp::Save);
        assert_eq!(ops[1], SurfaceOp::Translate { dx: 30.0, dy: 0.0 });
        assert!(matches!(ops[2], SurfaceOp::TileImage { dest, .. } if dest == Rect::from_size(100.0, 40.0)));
        assert_eq!(ops[3], SurfaceOp::Restore);
    }

    #[test]
    fn test_cache_reuses_plan_until_style_changes() {
        let mut cache = PlanCache::new();
        let mut style = Style::solid(Color::RED, 255);

        let first = match cache.plan_for(&style, 0).unwrap() {
            PlanUse::Shared(plan) => plan,
            other => panic!("expected shared plan, got {other:?}"),
        };
        let second = match cache.plan_for(&style, 1).unwrap() {
            PlanUse::Shared(plan) => plan,
            other => panic!("expected shared plan, got {other:?}"),
        };
        assert!(Arc::ptr_eq(&first, &second));

        style.set_bg_color(Color::BLUE);
        let rebuilt = match cache.plan_for(&style, 2).unwrap() {
            PlanUse::Shared(plan) => plan,
            other => panic!("expected shared plan, got {other:?}"),
        };
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_second_use_in_same_frame_is_by_value() {
        let mut cache = PlanCache::new();
        let style = Style::solid(Color::RED, 255);
        assert!(matches!(cache.plan_for(&style, 7), Ok(PlanUse::Shared(_))));
        assert!(matches!(cache.plan_for(&style, 7), Ok(PlanUse::AlreadyQueued(_))));
        assert!(matches!(cache.plan_for(&style, 8), Ok(PlanUse::Shared(_))));
    }

    #[test]
    fn test_unsupported_styles_are_cached_as_errors() {
        let mut cache = PlanCache::new();
        let mut style = Style::new();
        style.set_background_type(BackgroundType::GradientLinearHorizontal);
        assert!(cache.plan_for(&style, 0).is_err());
        assert!(cache.plan_for(&style, 1).is_err());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_idle_plans_are_evicted() {
        let mut cache = PlanCache::new();
        let kept = Style::solid(Color::RED, 255);
        let idle = Style::solid(Color::BLUE, 255);
        let mut unsupported = Style::new();
        unsupported.set_background_type(BackgroundType::GradientRadial);

        cache.plan_for(&kept, 0).unwrap();
        cache.plan_for(&idle, 0).unwrap();
        assert!(cache.plan_for(&unsupported, 0).is_err());
        for frame in 1..=5 {
            cache.plan_for(&kept, frame).unwrap();
        }

        assert_eq!(cache.evict_idle(5, 3), 2);
        assert_eq!(cache.len(), 1);
        assert!(matches!(cache.plan_for(&kept, 6), Ok(PlanUse::Shared(_))));
        assert_eq!(cache.evict_idle(6, 3), 0);
    }
}
