//! Recorded draw commands
//!
//! A [`DrawCommand`] is one drawing call captured by value on the UI thread:
//! the arguments, the clip that was active, and for paint-bearing calls the
//! color and alpha at record time. Replay applies exactly that state, so
//! anything the UI thread changes after recording has no effect on it.

use std::sync::Arc;

use smallvec::SmallVec;
use vela_paint::{
    ArcSegment, Color, Font, GradientFill, Image, Path, Point, Rect, RgbData, Stroke, Surface,
    Transform2D,
};

use crate::plan::{BackgroundRenderer, CachedPaintPlan, PlanGeometry};

/// Color and alpha captured when a command was recorded
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintSnapshot {
    pub color: Color,
    pub alpha: u8,
}

impl PaintSnapshot {
    fn apply(&self, surface: &mut dyn Surface) {
        surface.set_color(self.color);
        surface.set_alpha(self.alpha);
    }
}

/// Polygon vertices; small polygons stay inline
pub type Points = SmallVec<[Point; 8]>;

/// The primitive a command replays
#[derive(Clone, Debug)]
pub enum DrawOp {
    // === Transforms (no paint state) ===
    Rotate {
        angle: f32,
        pivot: Option<Point>,
    },
    Scale {
        sx: f32,
        sy: f32,
    },
    ResetAffine,
    SetTransform(Transform2D),

    // === Shapes ===
    FillRect {
        rect: Rect,
        paint: PaintSnapshot,
    },
    /// Fill with an explicit alpha, then put the context alpha back
    FillRectWithAlpha {
        rect: Rect,
        paint: PaintSnapshot,
        restore_alpha: u8,
    },
    DrawRect {
        rect: Rect,
        paint: PaintSnapshot,
    },
    FillRoundRect {
        rect: Rect,
        arc_width: f32,
        arc_height: f32,
        paint: PaintSnapshot,
    },
    DrawRoundRect {
        rect: Rect,
        arc_width: f32,
        arc_height: f32,
        paint: PaintSnapshot,
    },
    FillArc {
        arc: ArcSegment,
        paint: PaintSnapshot,
    },
    DrawArc {
        arc: ArcSegment,
        paint: PaintSnapshot,
    },
    DrawLine {
        from: Point,
        to: Point,
        paint: PaintSnapshot,
    },
    FillPolygon {
        points: Points,
        paint: PaintSnapshot,
    },
    DrawPolygon {
        points: Points,
        paint: PaintSnapshot,
    },
    FillPath {
        path: Path,
        paint: PaintSnapshot,
    },
    DrawPath {
        path: Path,
        stroke: Stroke,
        paint: PaintSnapshot,
    },
    /// Gradients carry their own colors; only alpha is captured
    FillGradient {
        gradient: GradientFill,
        rect: Rect,
        alpha: u8,
    },

    // === Text and images ===
    DrawString {
        text: Arc<str>,
        origin: Point,
        font: Font,
        paint: PaintSnapshot,
    },
    DrawImage {
        image: Image,
        origin: Point,
        alpha: u8,
    },
    DrawImageScaled {
        image: Image,
        dest: Rect,
        alpha: u8,
    },
    TileImage {
        image: Image,
        dest: Rect,
        alpha: u8,
    },
    DrawRgb {
        data: RgbData,
        origin: Point,
        alpha: u8,
    },

    // === Backgrounds ===
    /// Shared per-style plan; geometry is bound late by `prepare`
    CachedBackground(Arc<CachedPaintPlan>),
    /// One-off background with geometry captured by value
    Background {
        renderer: Arc<BackgroundRenderer>,
        geometry: PlanGeometry,
    },
}

impl DrawOp {
    /// Paint state captured with the op, if it draws with color and alpha
    pub fn paint(&self) -> Option<PaintSnapshot> {
        match self {
            DrawOp::FillRect { paint, .. }
            | DrawOp::FillRectWithAlpha { paint, .. }
            | DrawOp::DrawRect { paint, .. }
            | DrawOp::FillRoundRect { paint, .. }
            | DrawOp::DrawRoundRect { paint, .. }
            | DrawOp::FillArc { paint, .. }
            | DrawOp::DrawArc { paint, .. }
            | DrawOp::DrawLine { paint, .. }
            | DrawOp::FillPolygon { paint, .. }
            | DrawOp::DrawPolygon { paint, .. }
            | DrawOp::FillPath { paint, .. }
            | DrawOp::DrawPath { paint, .. }
            | DrawOp::DrawString { paint, .. } => Some(*paint),
            _ => None,
        }
    }

    pub fn is_transform(&self) -> bool {
        matches!(
            self,
            DrawOp::Rotate { .. } | DrawOp::Scale { .. } | DrawOp::ResetAffine | DrawOp::SetTransform(_)
        )
    }
}

/// One recorded drawing call and the clip it was recorded under
#[derive(Clone, Debug)]
pub struct DrawCommand {
    clip: Rect,
    op: DrawOp,
}

impl DrawCommand {
    pub fn new(clip: Rect, op: DrawOp) -> Self {
        Self { clip, op }
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    pub fn op(&self) -> &DrawOp {
        &self.op
    }

    /// Late binding, run on each command as its frame becomes active.
    ///
    /// Cached backgrounds publish the geometry recorded for this frame and
    /// take over its clip.
    pub fn prepare(&mut self) {
        if let DrawOp::CachedBackground(plan) = &self.op {
            self.clip = plan.commit().clip;
        }
    }

    /// Apply the recorded clip, then replay
    pub fn execute_with_clip(&self, surface: &mut dyn Surface) {
        surface.set_clip(self.clip);
        self.execute(surface);
    }

    pub fn execute(&self, surface: &mut dyn Surface) {
        match &self.op {
            DrawOp::Rotate { angle, pivot } => surface.rotate(*angle, *pivot),
            DrawOp::Scale { sx, sy } => surface.scale(*sx, *sy),
            DrawOp::ResetAffine => surface.reset_affine(),
            DrawOp::SetTransform(transform) => surface.set_transform(*transform),
            DrawOp::FillRect { rect, paint } => {
                paint.apply(surface);
                surface.fill_rect(*rect);
            }
            DrawOp::FillRectWithAlpha {
                rect,
                paint,
                restore_alpha,
            } => {
                paint.apply(surface);
                surface.fill_rect(*rect);
                surface.set_alpha(*restore_alpha);
            }
            DrawOp::DrawRect { rect, paint } => {
                paint.apply(surface);
                surface.draw_rect(*rect);
            }
            DrawOp::FillRoundRect {
                rect,
                arc_width,
                arc_height,
                paint,
            } => {
                paint.apply(surface);
                surface.fill_round_rect(*rect, *arc_width, *arc_height);
            }
            DrawOp::DrawRoundRect {
                rect,
                arc_width,
                arc_height,
                paint,
            } => {
                paint.apply(surface);
                surface.draw_round_rect(*rect, *arc_width, *arc_height);
            }
            DrawOp::FillArc { arc, paint } => {
                paint.apply(surface);
                surface.fill_arc(*arc);
            }
            DrawOp::DrawArc { arc, paint } => {
                paint.apply(surface);
                surface.draw_arc(*arc);
            }
            DrawOp::DrawLine { from, to, paint } => {
                paint.apply(surface);
                surface.draw_line(*from, *to);
            }
            DrawOp::FillPolygon { points, paint } => {
                paint.apply(surface);
                surface.fill_polygon(points);
            }
            DrawOp::DrawPolygon { points, paint } => {
                paint.apply(surface);
                surface.draw_polygon(points);
            }
            DrawOp::FillPath { path, paint } => {
                paint.apply(surface);
                surface.fill_path(path);
            }
            DrawOp::DrawPath {
                path,
                stroke,
                paint,
            } => {
                paint.apply(surface);
                surface.draw_path(path, stroke);
            }
            DrawOp::FillGradient {
                gradient,
                rect,
                alpha,
            } => {
                surface.set_alpha(*alpha);
                surface.fill_gradient(gradient, *rect);
            }
            DrawOp::DrawString {
                text,
                origin,
                font,
                paint,
            } => {
                surface.set_font(font);
                paint.apply(surface);
                surface.draw_string(text, *origin);
            }
            DrawOp::DrawImage {
                image,
                origin,
                alpha,
            } => {
                surface.set_alpha(*alpha);
                surface.draw_image(image, *origin);
            }
            DrawOp::DrawImageScaled { image, dest, alpha } => {
                surface.set_alpha(*alpha);
                surface.draw_image_scaled(image, *dest);
            }
            DrawOp::TileImage { image, dest, alpha } => {
                surface.set_alpha(*alpha);
                surface.tile_image(image, *dest);
            }
            DrawOp::DrawRgb {
                data,
                origin,
                alpha,
            } => {
                surface.set_alpha(*alpha);
                surface.draw_rgb(data, *origin);
            }
            DrawOp::CachedBackground(plan) => plan.render(surface),
            DrawOp::Background { renderer, geometry } => renderer.render(surface, geometry),
        }
    }
}
