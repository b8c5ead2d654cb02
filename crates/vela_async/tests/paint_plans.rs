//! Integration tests for cached background paint plans
//!
//! A plan is shared between frames; only its geometry changes. These tests
//! check that replay always paints the geometry of the frame being replayed.

use std::sync::Arc;
use std::time::Duration;

use vela_async::{
    AsyncRenderConfig, BackgroundType, DeferredGraphicsContext, FlushOutcome, Style,
};
use vela_paint::{Color, Image, Rect, RecordingSurface, SurfaceOp};
use vela_platform::{RedrawScheduler, SurfaceExtent};

struct NoopScheduler;

impl RedrawScheduler for NoopScheduler {
    fn schedule_redraw(&self, _region: Option<Rect>) {}
}

fn context(config: &AsyncRenderConfig) -> DeferredGraphicsContext {
    DeferredGraphicsContext::new(config, Arc::new(NoopScheduler), SurfaceExtent::new(320, 480))
}

fn fill_rects(surface: &RecordingSurface) -> Vec<Rect> {
    surface
        .drawing_calls()
        .iter()
        .filter_map(|call| match call.op {
            SurfaceOp::FillRect(rect) => Some(rect),
            _ => None,
        })
        .collect()
}

/// Frame 1 records the background at x=0, frame 2 at x=50 before frame 1 is
/// replayed. Frame 1 must still paint at x=0.
#[test]
fn test_replay_uses_geometry_of_its_own_frame() {
    let config = AsyncRenderConfig::default()
        .with_drain_wait(Duration::from_millis(1))
        .with_drain_retries(2);
    let mut ctx = context(&config);
    let compositor = ctx.compositor();
    let style = Style::solid(Color::BLUE, 255);

    ctx.paint_component_background(Rect::new(0.0, 0.0, 100.0, 40.0), &style);
    assert!(ctx.flush().is_submitted());

    ctx.paint_component_background(Rect::new(50.0, 0.0, 100.0, 40.0), &style);
    assert_eq!(ctx.flush(), FlushOutcome::Backpressure { backlog: 1 });

    let mut frame1 = RecordingSurface::new(320, 480);
    compositor.replay(&mut frame1);
    assert_eq!(fill_rects(&frame1), vec![Rect::new(0.0, 0.0, 100.0, 40.0)]);
    assert_eq!(frame1.drawing_calls()[0].color, Color::BLUE);

    assert!(ctx.flush().is_submitted());
    let mut frame2 = RecordingSurface::new(320, 480);
    compositor.replay(&mut frame2);
    assert_eq!(fill_rects(&frame2), vec![Rect::new(50.0, 0.0, 100.0, 40.0)]);
}

/// The background clip is the one active when it was recorded
#[test]
fn test_background_replays_with_recorded_clip() {
    let mut ctx = context(&AsyncRenderConfig::default());
    let compositor = ctx.compositor();
    let style = Style::solid(Color::RED, 255);

    let clip = Rect::new(0.0, 0.0, 60.0, 20.0);
    ctx.set_clip(clip);
    ctx.paint_component_background(Rect::new(0.0, 0.0, 100.0, 40.0), &style);
    ctx.set_clip(Rect::from_size(1.0, 1.0));
    ctx.flush();

    let mut surface = RecordingSurface::new(320, 480);
    compositor.replay(&mut surface);
    assert_eq!(surface.drawing_calls()[0].clip, clip);
}

/// Two components sharing one style in the same frame both paint, each at
/// its own position
#[test]
fn test_shared_style_twice_in_one_frame() {
    let mut ctx = context(&AsyncRenderConfig::default());
    let compositor = ctx.compositor();
    let style = Style::solid(Color::GREEN, 255);

    ctx.paint_component_background(Rect::new(0.0, 0.0, 10.0, 10.0), &style);
    ctx.paint_component_background(Rect::new(0.0, 30.0, 10.0, 10.0), &style);
    ctx.flush();

    let mut surface = RecordingSurface::new(320, 480);
    compositor.replay(&mut surface);
    assert_eq!(
        fill_rects(&surface),
        vec![Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 30.0, 10.0, 10.0)]
    );
}

/// Changing a style rebuilds its plan on the next use
#[test]
fn test_style_change_takes_effect_next_frame() {
    let mut ctx = context(&AsyncRenderConfig::default());
    let compositor = ctx.compositor();
    let mut style = Style::solid(Color::RED, 255);
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);

    ctx.paint_component_background(rect, &style);
    ctx.flush();
    let mut surface = RecordingSurface::new(320, 480);
    compositor.replay(&mut surface);
    assert_eq!(surface.drawing_calls()[0].color, Color::RED);

    style.set_bg_color(Color::BLUE);
    ctx.paint_component_background(rect, &style);
    ctx.flush();
    surface.clear();
    compositor.replay(&mut surface);
    assert_eq!(surface.drawing_calls()[0].color, Color::BLUE);
}

#[test]
fn test_image_background_modes_replay() {
    let mut ctx = context(&AsyncRenderConfig::default());
    let compositor = ctx.compositor();
    let image = Image::solid(16, 16, 0xff00_ff00);

    let scaled = Style::with_image(image.clone(), BackgroundType::ImageScaled);
    let tiled = Style::with_image(image.clone(), BackgroundType::ImageTileHorizontalAlignTop);
    let gradient = {
        let mut style = Style::new();
        style.set_background_type(BackgroundType::GradientLinearVertical);
        style
    };

    let rect = Rect::new(10.0, 10.0, 64.0, 32.0);
    ctx.paint_component_background(rect, &scaled);
    ctx.paint_component_background(rect, &gradient);
    ctx.paint_component_background(rect, &tiled);
    ctx.flush();

    let mut surface = RecordingSurface::new(320, 480);
    compositor.replay(&mut surface);
    let ops: Vec<SurfaceOp> = surface
        .drawing_calls()
        .iter()
        .map(|call| call.op.clone())
        .collect();

    assert_eq!(
        ops,
        vec![
            SurfaceOp::DrawImageRegion {
                image_id: image.id(),
                src: Rect::from_size(16.0, 16.0),
                dest: rect,
            },
            SurfaceOp::FillRect(rect),
            SurfaceOp::TileImage {
                image_id: image.id(),
                dest: Rect::from_size(64.0, 16.0),
            },
        ]
    );
}
