//! Record, flush and replay throughput

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vela_async::{AsyncRenderConfig, DeferredGraphicsContext, Style};
use vela_paint::{Color, Point, Rect, RecordingSurface};
use vela_platform::{RedrawScheduler, SurfaceExtent};

struct NoopScheduler;

impl RedrawScheduler for NoopScheduler {
    fn schedule_redraw(&self, _region: Option<Rect>) {}
}

fn context(config: &AsyncRenderConfig) -> DeferredGraphicsContext {
    DeferredGraphicsContext::new(config, Arc::new(NoopScheduler), SurfaceExtent::new(1080, 1920))
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    for commands in [16usize, 256, 2048] {
        group.bench_with_input(BenchmarkId::new("fill_rect", commands), &commands, |b, &n| {
            let mut ctx = context(&AsyncRenderConfig::default());
            let compositor = ctx.compositor();
            let mut surface = RecordingSurface::new(1080, 1920);
            b.iter(|| {
                for i in 0..n {
                    ctx.set_color(if i % 2 == 0 { Color::RED } else { Color::BLUE });
                    ctx.fill_rect(Rect::new(i as f32, 0.0, 8.0, 8.0));
                }
                black_box(ctx.flush());
                black_box(compositor.replay(&mut surface));
                surface.clear();
            });
        });
    }
    group.finish();
}

fn bench_backgrounds(c: &mut Criterion) {
    let styles: Vec<Style> = (0..64)
        .map(|i| Style::solid(Color::from_rgb_u32(0x10_20_30 * i), 255))
        .collect();

    let mut group = c.benchmark_group("backgrounds");
    for cached in [true, false] {
        let name = if cached { "cached" } else { "legacy" };
        group.bench_function(name, |b| {
            let mut ctx = context(&AsyncRenderConfig::default().with_cached_backgrounds(cached));
            let compositor = ctx.compositor();
            let mut surface = RecordingSurface::new(1080, 1920);
            b.iter(|| {
                for (i, style) in styles.iter().enumerate() {
                    let y = i as f32 * 30.0;
                    ctx.paint_component_background(Rect::new(0.0, y, 1080.0, 30.0), style);
                    ctx.draw_string("row", Point::new(8.0, y + 20.0));
                }
                black_box(ctx.flush());
                black_box(compositor.replay(&mut surface));
                surface.clear();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frame, bench_backgrounds);
criterion_main!(benches);
