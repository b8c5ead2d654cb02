//! Producer-side graphics context
//!
//! [`DeferredGraphicsContext`] looks like an immediate-mode graphics object to
//! the UI toolkit, but it never touches a surface. Each call becomes one
//! [`DrawCommand`] that captures the clip, color and alpha in effect right
//! now, and [`flush`](DeferredGraphicsContext::flush) hands the frame over.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Arc;

use vela_paint::{
    ArcSegment, Color, Font, GradientFill, Image, Path, Point, Rect, RgbData, Stroke, Transform2D,
};
use vela_platform::{RedrawScheduler, SurfaceExtent};

use crate::command::{DrawCommand, DrawOp, PaintSnapshot, Points};
use crate::compositor::Compositor;
use crate::config::AsyncRenderConfig;
use crate::plan::{BackgroundRenderer, PlanCache, PlanGeometry, PlanUse};
use crate::queue::{CommandQueue, FlushOutcome, QueueState};
use crate::style::Style;

/// The producer's current clip. `None` means the whole surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClipState {
    clip: Option<Rect>,
}

impl ClipState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clip
    pub fn set(&mut self, rect: Rect) {
        self.clip = Some(rect);
    }

    /// Narrow the clip. With no clip set, `rect` becomes the clip.
    pub fn intersect(&mut self, rect: Rect) {
        self.clip = Some(match self.clip {
            Some(current) => current.intersection(&rect),
            None => rect,
        });
    }

    pub fn reset(&mut self) {
        self.clip = None;
    }

    pub fn get(&self) -> Option<Rect> {
        self.clip
    }

    /// The clip, or `full` when none is set
    pub fn resolve(&self, full: Rect) -> Rect {
        self.clip.unwrap_or(full)
    }
}

/// Records drawing calls for deferred replay.
///
/// Owned by the UI thread. The context is `Send` so it can be created
/// elsewhere and moved there, but not `Sync`: all recording, paint state
/// and flushing happen on one thread.
pub struct DeferredGraphicsContext {
    queue: CommandQueue,
    scheduler: Arc<dyn RedrawScheduler>,
    extent: SurfaceExtent,
    clip: ClipState,
    color: Color,
    alpha: u8,
    font: Font,
    transform: Transform2D,
    plans: PlanCache,
    cached_backgrounds: bool,
    plan_idle_frames: u64,
    _not_sync: PhantomData<Cell<()>>,
}

impl std::fmt::Debug for DeferredGraphicsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredGraphicsContext")
            .field("pending", &self.queue.pending_len())
            .field("clip", &self.clip)
            .field("color", &self.color)
            .field("alpha", &self.alpha)
            .field("plans", &self.plans.len())
            .finish_non_exhaustive()
    }
}

impl DeferredGraphicsContext {
    pub fn new(
        config: &AsyncRenderConfig,
        scheduler: Arc<dyn RedrawScheduler>,
        extent: SurfaceExtent,
    ) -> Self {
        Self {
            queue: CommandQueue::new(config),
            scheduler,
            extent,
            clip: ClipState::new(),
            color: Color::BLACK,
            alpha: 255,
            font: Font::default(),
            transform: Transform2D::identity(),
            plans: PlanCache::new(),
            cached_backgrounds: config.cached_backgrounds,
            plan_idle_frames: config.plan_idle_frames,
            _not_sync: PhantomData,
        }
    }

    /// Consumer handle for the host's drawing thread
    pub fn compositor(&self) -> Compositor {
        self.queue.compositor()
    }

    pub fn extent(&self) -> &SurfaceExtent {
        &self.extent
    }

    // === Paint state ===

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    // === Clipping ===

    pub fn set_clip(&mut self, rect: Rect) {
        self.clip.set(rect);
    }

    /// Intersect the clip with `rect`
    pub fn clip_rect(&mut self, rect: Rect) {
        self.clip.intersect(rect);
    }

    /// Current clip, or the full surface when none is set
    pub fn clip(&self) -> Rect {
        self.clip.resolve(self.extent.full_rect())
    }

    pub fn clip_x(&self) -> f32 {
        self.clip().x
    }

    pub fn clip_y(&self) -> f32 {
        self.clip().y
    }

    pub fn clip_width(&self) -> f32 {
        self.clip().width
    }

    pub fn clip_height(&self) -> f32 {
        self.clip().height
    }

    // === Transforms ===

    pub fn rotate(&mut self, angle: f32) {
        self.transform = Transform2D::rotate(angle).then(&self.transform);
        self.record(DrawOp::Rotate { angle, pivot: None });
    }

    pub fn rotate_around(&mut self, angle: f32, pivot: Point) {
        self.transform = Transform2D::rotate_around(angle, pivot).then(&self.transform);
        self.record(DrawOp::Rotate {
            angle,
            pivot: Some(pivot),
        });
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = Transform2D::scale(sx, sy).then(&self.transform);
        self.record(DrawOp::Scale { sx, sy });
    }

    pub fn reset_affine(&mut self) {
        self.transform = Transform2D::identity();
        self.record(DrawOp::ResetAffine);
    }

    pub fn set_transform(&mut self, transform: Transform2D) {
        self.transform = transform;
        self.record(DrawOp::SetTransform(transform));
    }

    /// Transform the replayed commands will be drawn under
    pub fn transform(&self) -> Transform2D {
        self.transform
    }

    // === Shapes ===

    pub fn fill_rect(&mut self, rect: Rect) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::FillRect { rect, paint });
        }
    }

    /// Fill with `alpha` instead of the context alpha, leaving the latter as is
    pub fn fill_rect_with_alpha(&mut self, rect: Rect, alpha: u8) {
        if alpha == 0 {
            return;
        }
        self.record(DrawOp::FillRectWithAlpha {
            rect,
            paint: PaintSnapshot {
                color: self.color,
                alpha,
            },
            restore_alpha: self.alpha,
        });
    }

    pub fn draw_rect(&mut self, rect: Rect) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::DrawRect { rect, paint });
        }
    }

    pub fn fill_round_rect(&mut self, rect: Rect, arc_width: f32, arc_height: f32) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::FillRoundRect {
                rect,
                arc_width,
                arc_height,
                paint,
            });
        }
    }

    pub fn draw_round_rect(&mut self, rect: Rect, arc_width: f32, arc_height: f32) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::DrawRoundRect {
                rect,
                arc_width,
                arc_height,
                paint,
            });
        }
    }

    pub fn fill_arc(&mut self, arc: ArcSegment) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::FillArc { arc, paint });
        }
    }

    pub fn draw_arc(&mut self, arc: ArcSegment) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::DrawArc { arc, paint });
        }
    }

    pub fn draw_line(&mut self, from: Point, to: Point) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::DrawLine { from, to, paint });
        }
    }

    pub fn fill_polygon(&mut self, points: &[Point]) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::FillPolygon {
                points: Points::from_slice(points),
                paint,
            });
        }
    }

    pub fn draw_polygon(&mut self, points: &[Point]) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::DrawPolygon {
                points: Points::from_slice(points),
                paint,
            });
        }
    }

    pub fn fill_path(&mut self, path: &Path) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::FillPath {
                path: path.clone(),
                paint,
            });
        }
    }

    pub fn draw_path(&mut self, path: &Path, stroke: &Stroke) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::DrawPath {
                path: path.clone(),
                stroke: *stroke,
                paint,
            });
        }
    }

    // === Gradients ===

    pub fn fill_linear_gradient(&mut self, start: Color, end: Color, rect: Rect, horizontal: bool) {
        self.fill_gradient(GradientFill::linear(start, end, horizontal), rect);
    }

    pub fn fill_radial_gradient(&mut self, start: Color, end: Color, rect: Rect) {
        self.fill_gradient(GradientFill::radial(start, end), rect);
    }

    pub fn fill_rect_radial_gradient(
        &mut self,
        start: Color,
        end: Color,
        rect: Rect,
        relative_x: f32,
        relative_y: f32,
        relative_size: f32,
    ) {
        self.fill_gradient(
            GradientFill::RectRadial {
                start,
                end,
                relative_x,
                relative_y,
                relative_size,
            },
            rect,
        );
    }

    fn fill_gradient(&mut self, gradient: GradientFill, rect: Rect) {
        if self.alpha == 0 {
            return;
        }
        self.record(DrawOp::FillGradient {
            gradient,
            rect,
            alpha: self.alpha,
        });
    }

    // === Text and images ===

    pub fn draw_string(&mut self, text: &str, origin: Point) {
        if let Some(paint) = self.paint() {
            self.record(DrawOp::DrawString {
                text: Arc::from(text),
                origin,
                font: self.font.clone(),
                paint,
            });
        }
    }

    /// Draw a label's text. The label bounds narrow the clip for this and
    /// every later call until the clip is replaced or the frame is flushed.
    pub fn draw_label_text(&mut self, bounds: Rect, text: &str) {
        self.clip.intersect(bounds);
        self.draw_string(text, bounds.origin());
    }

    pub fn draw_image(&mut self, image: &Image, origin: Point) {
        if self.alpha == 0 {
            return;
        }
        self.record(DrawOp::DrawImage {
            image: image.clone(),
            origin,
            alpha: self.alpha,
        });
    }

    pub fn draw_image_scaled(&mut self, image: &Image, dest: Rect) {
        if self.alpha == 0 {
            return;
        }
        self.record(DrawOp::DrawImageScaled {
            image: image.clone(),
            dest,
            alpha: self.alpha,
        });
    }

    pub fn tile_image(&mut self, image: &Image, dest: Rect) {
        if self.alpha == 0 {
            return;
        }
        self.record(DrawOp::TileImage {
            image: image.clone(),
            dest,
            alpha: self.alpha,
        });
    }

    pub fn draw_rgb(&mut self, data: &RgbData, origin: Point) {
        if self.alpha == 0 {
            return;
        }
        self.record(DrawOp::DrawRgb {
            data: data.clone(),
            origin,
            alpha: self.alpha,
        });
    }

    // === Backgrounds ===

    /// Paint a component's style background into `rect`.
    ///
    /// With cached backgrounds enabled the style's plan is reused across
    /// frames and only its geometry is recorded. Backgrounds the async path
    /// cannot paint (gradients, fully transparent colors) are skipped.
    pub fn paint_component_background(&mut self, rect: Rect, style: &Style) {
        if self.alpha == 0 || rect.is_empty() {
            return;
        }
        let geometry = PlanGeometry {
            rect,
            clip: self.clip(),
            alpha: self.alpha,
        };

        if !self.cached_backgrounds {
            match BackgroundRenderer::classify(style) {
                Ok(renderer) => self.record_background(Arc::new(renderer), geometry),
                Err(err) => {
                    tracing::trace!(style = style.id().to_raw(), %err, "background skipped")
                }
            }
            return;
        }

        match self.plans.plan_for(style, self.queue.generation()) {
            Ok(PlanUse::Shared(plan)) => {
                plan.record(geometry);
                self.queue
                    .push(DrawCommand::new(geometry.clip, DrawOp::CachedBackground(plan)));
            }
            Ok(PlanUse::AlreadyQueued(renderer)) => self.record_background(renderer, geometry),
            Err(err) => {
                tracing::trace!(style = style.id().to_raw(), %err, "background skipped")
            }
        }
    }

    /// Drop every cached background plan. Frames already queued keep theirs.
    pub fn invalidate_background_cache(&mut self) {
        self.plans.clear();
    }

    /// Number of styles with a cached background plan
    pub fn cached_plan_count(&self) -> usize {
        self.plans.len()
    }

    fn record_background(&mut self, renderer: Arc<BackgroundRenderer>, geometry: PlanGeometry) {
        self.queue.push(DrawCommand::new(
            geometry.clip,
            DrawOp::Background { renderer, geometry },
        ));
    }

    // === Frame handoff ===

    /// Hand the recorded frame to the consumer and request a full redraw
    pub fn flush(&mut self) -> FlushOutcome {
        self.flush_region(None)
    }

    /// Hand the recorded frame to the consumer and request a redraw of
    /// `region` (the whole view when `None`).
    ///
    /// Whatever the outcome, clip, alpha and color go back to their defaults.
    pub fn flush_region(&mut self, region: Option<Rect>) -> FlushOutcome {
        let outcome = self.queue.try_submit();
        if let FlushOutcome::Submitted { commands } = outcome {
            let generation = self.queue.generation();
            tracing::debug!(commands, generation, "frame submitted");
            let evicted = self.plans.evict_idle(generation, self.plan_idle_frames);
            if evicted > 0 {
                tracing::trace!(evicted, "idle paint plans evicted");
            }
            self.scheduler.schedule_redraw(region);
        }

        self.clip.reset();
        self.alpha = 255;
        self.color = Color::BLACK;
        outcome
    }

    /// Commands recorded since the last successful flush
    pub fn pending_commands(&self) -> &[DrawCommand] {
        self.queue.pending()
    }

    pub fn queue_state(&self) -> QueueState {
        self.queue.state()
    }

    /// Paint state for a paint-bearing call, `None` when it would be invisible
    fn paint(&self) -> Option<PaintSnapshot> {
        (self.alpha != 0).then_some(PaintSnapshot {
            color: self.color,
            alpha: self.alpha,
        })
    }

    fn record(&mut self, op: DrawOp) {
        let clip = self.clip();
        self.queue.push(DrawCommand::new(clip, op));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingScheduler {
        requests: Mutex<Vec<Option<Rect>>>,
    }

    impl RedrawScheduler for RecordingScheduler {
        fn schedule_redraw(&self, region: Option<Rect>) {
            self.requests.lock().push(region);
        }
    }

    fn context() -> (DeferredGraphicsContext, Arc<RecordingScheduler>) {
        let scheduler = Arc::new(RecordingScheduler::default());
        let ctx = DeferredGraphicsContext::new(
            &AsyncRenderConfig::default(),
            scheduler.clone(),
            SurfaceExtent::new(320, 480),
        );
        (ctx, scheduler)
    }

    #[test]
    fn test_clip_defaults_to_full_surface() {
        let (mut ctx, _) = context();
        assert_eq!(ctx.clip(), Rect::from_size(320.0, 480.0));
        assert_eq!((ctx.clip_x(), ctx.clip_width()), (0.0, 320.0));

        ctx.clip_rect(Rect::new(10.0, 10.0, 50.0, 50.0));
        ctx.clip_rect(Rect::new(30.0, 0.0, 100.0, 40.0));
        assert_eq!(ctx.clip(), Rect::new(30.0, 10.0, 30.0, 30.0));

        ctx.set_clip(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(ctx.clip_y(), 2.0);
        assert_eq!(ctx.clip_height(), 4.0);
    }

    #[test]
    fn test_disjoint_clip_is_empty() {
        let mut clip = ClipState::new();
        clip.intersect(Rect::new(0.0, 0.0, 10.0, 10.0));
        clip.intersect(Rect::new(20.0, 20.0, 10.0, 10.0));
        assert!(clip.resolve(Rect::from_size(100.0, 100.0)).is_empty());
    }

    #[test]
    fn test_commands_capture_clip_at_record_time() {
        let (mut ctx, _) = context();
        let clip = Rect::new(0.0, 0.0, 10.0, 10.0);
        ctx.set_clip(clip);
        ctx.draw_rect(Rect::new(1.0, 1.0, 2.0, 2.0));
        ctx.set_clip(Rect::from_size(1.0, 1.0));

        assert_eq!(ctx.pending_commands()[0].clip(), clip);
    }

    #[test]
    fn test_zero_alpha_calls_are_elided() {
        let (mut ctx, _) = context();
        ctx.set_alpha(0);
        ctx.fill_rect(Rect::from_size(10.0, 10.0));
        ctx.draw_string("hidden", Point::ZERO);
        ctx.draw_image(&Image::solid(1, 1, 0), Point::ZERO);
        ctx.fill_linear_gradient(Color::RED, Color::BLUE, Rect::from_size(5.0, 5.0), true);
        ctx.paint_component_background(Rect::from_size(10.0, 10.0), &Style::new());
        assert!(ctx.pending_commands().is_empty());

        ctx.rotate(1.0);
        assert_eq!(ctx.pending_commands().len(), 1);
        assert!(ctx.pending_commands()[0].op().is_transform());
    }

    #[test]
    fn test_explicit_alpha_fill_ignores_context_alpha() {
        let (mut ctx, _) = context();
        ctx.set_alpha(0);
        ctx.fill_rect_with_alpha(Rect::from_size(10.0, 10.0), 128);
        match ctx.pending_commands()[0].op() {
            DrawOp::FillRectWithAlpha {
                paint,
                restore_alpha,
                ..
            } => {
                assert_eq!(paint.alpha, 128);
                assert_eq!(*restore_alpha, 0);
            }
            other => panic!("unexpected op {other:?}"),
        }
        ctx.fill_rect_with_alpha(Rect::from_size(10.0, 10.0), 0);
        assert_eq!(ctx.pending_commands().len(), 1);
    }

    #[test]
    fn test_flush_resets_paint_state() {
        let (mut ctx, scheduler) = context();
        ctx.set_color(Color::RED);
        ctx.set_alpha(10);
        ctx.set_clip(Rect::from_size(5.0, 5.0));
        ctx.fill_rect(Rect::from_size(1.0, 1.0));

        let region = Rect::new(0.0, 0.0, 5.0, 5.0);
        assert_eq!(ctx.flush_region(Some(region)), FlushOutcome::Submitted { commands: 1 });
        assert_eq!(ctx.color(), Color::BLACK);
        assert_eq!(ctx.alpha(), 255);
        assert_eq!(ctx.clip(), Rect::from_size(320.0, 480.0));
        assert_eq!(*scheduler.requests.lock(), vec![Some(region)]);
    }

    #[test]
    fn test_empty_flush_requests_no_redraw() {
        let (mut ctx, scheduler) = context();
        assert_eq!(ctx.flush(), FlushOutcome::Empty);
        assert!(scheduler.requests.lock().is_empty());
    }

    #[test]
    fn test_label_text_narrows_clip() {
        let (mut ctx, _) = context();
        let bounds = Rect::new(10.0, 20.0, 100.0, 30.0);
        ctx.draw_label_text(bounds, "Label");

        let command = &ctx.pending_commands()[0];
        assert_eq!(command.clip(), bounds);
        assert!(matches!(
            command.op(),
            DrawOp::DrawString { origin, .. } if *origin == Point::new(10.0, 20.0)
        ));
        assert_eq!(ctx.clip(), bounds);
    }

    #[test]
    fn test_transforms_track_producer_matrix() {
        let (mut ctx, _) = context();
        ctx.scale(2.0, 3.0);
        assert_eq!(ctx.transform().apply(Point::new(1.0, 1.0)), Point::new(2.0, 3.0));
        ctx.reset_affine();
        assert!(ctx.transform().is_identity());
    }

    #[test]
    fn test_legacy_backgrounds_are_recorded_by_value() {
        let scheduler = Arc::new(RecordingScheduler::default());
        let mut ctx = DeferredGraphicsContext::new(
            &AsyncRenderConfig::default().with_cached_backgrounds(false),
            scheduler,
            SurfaceExtent::new(100, 100),
        );
        let style = Style::solid(Color::GREEN, 255);
        ctx.paint_component_background(Rect::from_size(10.0, 10.0), &style);
        assert!(matches!(
            ctx.pending_commands()[0].op(),
            DrawOp::Background { .. }
        ));
    }

    #[test]
    fn test_cached_background_second_use_in_frame_is_by_value() {
        let (mut ctx, _) = context();
        let style = Style::solid(Color::GREEN, 255);
        ctx.paint_component_background(Rect::new(0.0, 0.0, 10.0, 10.0), &style);
        ctx.paint_component_background(Rect::new(0.0, 20.0, 10.0, 10.0), &style);

        let ops: Vec<_> = ctx.pending_commands().iter().map(|c| c.op()).collect();
        assert!(matches!(ops[0], DrawOp::CachedBackground(_)));
        match ops[1] {
            DrawOp::Background { geometry, .. } => assert_eq!(geometry.rect.y, 20.0),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_background_is_skipped() {
        let (mut ctx, _) = context();
        let mut style = Style::new();
        style.set_background_type(crate::style::BackgroundType::GradientLinearVertical);
        ctx.paint_component_background(Rect::from_size(10.0, 10.0), &style);
        assert!(ctx.pending_commands().is_empty());
    }

    #[test]
    fn test_plans_of_dropped_styles_are_evicted() {
        let scheduler = Arc::new(RecordingScheduler::default());
        let mut ctx = DeferredGraphicsContext::new(
            &AsyncRenderConfig::default().with_plan_idle_frames(2),
            scheduler,
            SurfaceExtent::new(100, 100),
        );
        let compositor = ctx.compositor();
        let mut surface = vela_paint::RecordingSurface::new(100, 100);
        let image = Image::solid(4, 4, 0xff00_00ff);

        for _ in 0..1000 {
            let style = Style::with_image(image.clone(), crate::style::BackgroundType::ImageScaled);
            ctx.paint_component_background(Rect::from_size(10.0, 10.0), &style);
            assert!(ctx.flush().is_submitted());
            compositor.replay(&mut surface);
        }
        assert!(ctx.cached_plan_count() <= 3);
    }

    #[test]
    fn test_style_painted_every_frame_keeps_its_plan() {
        let scheduler = Arc::new(RecordingScheduler::default());
        let mut ctx = DeferredGraphicsContext::new(
            &AsyncRenderConfig::default().with_plan_idle_frames(1),
            scheduler,
            SurfaceExtent::new(100, 100),
        );
        let compositor = ctx.compositor();
        let mut surface = vela_paint::RecordingSurface::new(100, 100);
        let style = Style::solid(Color::RED, 255);

        let mut first: Option<Arc<crate::plan::CachedPaintPlan>> = None;
        for _ in 0..10 {
            ctx.paint_component_background(Rect::from_size(10.0, 10.0), &style);
            let plan = match ctx.pending_commands()[0].op() {
                DrawOp::CachedBackground(plan) => Arc::clone(plan),
                other => panic!("unexpected op {other:?}"),
            };
            let first = first.get_or_insert_with(|| Arc::clone(&plan));
            assert!(Arc::ptr_eq(first, &plan));
            assert!(ctx.flush().is_submitted());
            compositor.replay(&mut surface);
        }
        assert_eq!(ctx.cached_plan_count(), 1);
    }

    fn assert_send<T: Send>() {}

    #[test]
    fn test_context_is_send() {
        assert_send::<DeferredGraphicsContext>();
    }
}
