//! Recording surface for headless testing.
//!
//! [`RecordingSurface`] implements [`Surface`] without rasterising anything.
//! Every drawing call is logged together with the clip, color and alpha that
//! were in effect, which is exactly what callers need to check that deferred
//! commands replay with the state they were recorded with.

use crate::color::Color;
use crate::gradient::GradientFill;
use crate::image::{Font, Image, RgbData};
use crate::path::{Path, Point};
use crate::primitives::{ArcSegment, Rect};
use crate::stroke::Stroke;
use crate::surface::{OffscreenSurface, Surface};
use crate::transform::Transform2D;

/// A logged surface operation
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOp {
    FillRect(Rect),
    DrawRect(Rect),
    FillRoundRect {
        rect: Rect,
        arc_width: f32,
        arc_height: f32,
    },
    DrawRoundRect {
        rect: Rect,
        arc_width: f32,
        arc_height: f32,
    },
    FillArc(ArcSegment),
    DrawArc(ArcSegment),
    DrawLine {
        from: Point,
        to: Point,
    },
    FillPolygon(Vec<Point>),
    DrawPolygon(Vec<Point>),
    FillPath(Path),
    DrawPath {
        path: Path,
        stroke: Stroke,
    },
    FillGradient {
        gradient: GradientFill,
        rect: Rect,
    },
    DrawString {
        text: String,
        origin: Point,
        font: Option<Font>,
    },
    DrawImage {
        image_id: u64,
        origin: Point,
    },
    DrawImageScaled {
        image_id: u64,
        dest: Rect,
    },
    DrawImageRegion {
        image_id: u64,
        src: Rect,
        dest: Rect,
    },
    TileImage {
        image_id: u64,
        dest: Rect,
    },
    DrawRgb {
        width: u32,
        height: u32,
        origin: Point,
    },
    Rotate {
        angle: f32,
        pivot: Option<Point>,
    },
    Scale {
        sx: f32,
        sy: f32,
    },
    Translate {
        dx: f32,
        dy: f32,
    },
    SetTransform(Transform2D),
    ResetAffine,
    Save,
    Restore,
    /// The offscreen buffer was copied onto another surface
    Present,
}

impl SurfaceOp {
    /// Whether the op produces pixels (as opposed to transform/state bookkeeping)
    pub fn is_drawing(&self) -> bool {
        !matches!(
            self,
            SurfaceOp::Rotate { .. }
                | SurfaceOp::Scale { .. }
                | SurfaceOp::Translate { .. }
                | SurfaceOp::SetTransform(_)
                | SurfaceOp::ResetAffine
                | SurfaceOp::Save
                | SurfaceOp::Restore
                | SurfaceOp::Present
        )
    }
}

/// One logged call with the paint state it ran under
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceCall {
    pub op: SurfaceOp,
    pub clip: Rect,
    pub color: Color,
    pub alpha: u8,
}

#[derive(Clone, Debug)]
struct SavedState {
    clip: Rect,
    transform: Transform2D,
}

/// A [`Surface`] that records calls instead of drawing
#[derive(Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    clip: Rect,
    color: Color,
    alpha: u8,
    font: Option<Font>,
    transform: Transform2D,
    saved: Vec<SavedState>,
    calls: Vec<SurfaceCall>,
    snapshot: Image,
    presented: u64,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            clip: Rect::from_size(width as f32, height as f32),
            color: Color::BLACK,
            alpha: 255,
            font: None,
            transform: Transform2D::identity(),
            saved: Vec::new(),
            calls: Vec::new(),
            snapshot: Image::solid(1, 1, 0),
            presented: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Every logged call, in order
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Logged calls that produce pixels
    pub fn drawing_calls(&self) -> Vec<&SurfaceCall> {
        self.calls.iter().filter(|c| c.op.is_drawing()).collect()
    }

    /// Take ownership of the log, leaving it empty
    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Current surface transform, as composed from transform calls
    pub fn transform(&self) -> Transform2D {
        self.transform
    }

    /// How many times this surface was presented onto another one
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    fn log(&mut self, op: SurfaceOp) {
        self.calls.push(SurfaceCall {
            op,
            clip: self.clip,
            color: self.color,
            alpha: self.alpha,
        });
    }
}

impl Surface for RecordingSurface {
    fn set_clip(&mut self, clip: Rect) {
        self.clip = clip;
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }

    fn set_font(&mut self, font: &Font) {
        self.font = Some(font.clone());
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.log(SurfaceOp::FillRect(rect));
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.log(SurfaceOp::DrawRect(rect));
    }

    fn fill_round_rect(&mut self, rect: Rect, arc_width: f32, arc_height: f32) {
        self.log(SurfaceOp::FillRoundRect {
            rect,
            arc_width,
            arc_height,
        });
    }

    fn draw_round_rect(&mut self, rect: Rect, arc_width: f32, arc_height: f32) {
        self.log(SurfaceOp::DrawRoundRect {
            rect,
            arc_width,
            arc_height,
        });
    }

    fn fill_arc(&mut self, arc: ArcSegment) {
        self.log(SurfaceOp::FillArc(arc));
    }

    fn draw_arc(&mut self, arc: ArcSegment) {
        self.log(SurfaceOp::DrawArc(arc));
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        self.log(SurfaceOp::DrawLine { from, to });
    }

    fn fill_polygon(&mut self, points: &[Point]) {
        self.log(SurfaceOp::FillPolygon(points.to_vec()));
    }

    fn draw_polygon(&mut self, points: &[Point]) {
        self.log(SurfaceOp::DrawPolygon(points.to_vec()));
    }

    fn fill_path(&mut self, path: &Path) {
        self.log(SurfaceOp::FillPath(path.clone()));
    }

    fn draw_path(&mut self, path: &Path, stroke: &Stroke) {
        self.log(SurfaceOp::DrawPath {
            path: path.clone(),
            stroke: *stroke,
        });
    }

    fn fill_gradient(&mut self, gradient: &GradientFill, rect: Rect) {
        self.log(SurfaceOp::FillGradient {
            gradient: *gradient,
            rect,
        });
    }

    fn draw_string(&mut self, text: &str, origin: Point) {
        let font = self.font.clone();
        self.log(SurfaceOp::DrawString {
            text: text.to_string(),
            origin,
            font,
        });
    }

    fn draw_image(&mut self, image: &Image, origin: Point) {
        self.log(SurfaceOp::DrawImage {
            image_id: image.id(),
            origin,
        });
    }

    fn draw_image_scaled(&mut self, image: &Image, dest: Rect) {
        self.log(SurfaceOp::DrawImageScaled {
            image_id: image.id(),
            dest,
        });
    }

    fn draw_image_region(&mut self, image: &Image, src: Rect, dest: Rect) {
        self.log(SurfaceOp::DrawImageRegion {
            image_id: image.id(),
            src,
            dest,
        });
    }

    fn tile_image(&mut self, image: &Image, dest: Rect) {
        self.log(SurfaceOp::TileImage {
            image_id: image.id(),
            dest,
        });
    }

    fn draw_rgb(&mut self, data: &RgbData, origin: Point) {
        self.log(SurfaceOp::DrawRgb {
            width: data.width,
            height: data.height,
            origin,
        });
    }

    fn rotate(&mut self, angle: f32, pivot: Option<Point>) {
        let rotation = match pivot {
            Some(p) => Transform2D::rotate_around(angle, p),
            None => Transform2D::rotate(angle),
        };
        self.transform = rotation.then(&self.transform);
        self.log(SurfaceOp::Rotate { angle, pivot });
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = Transform2D::scale(sx, sy).then(&self.transform);
        self.log(SurfaceOp::Scale { sx, sy });
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = Transform2D::translate(dx, dy).then(&self.transform);
        self.log(SurfaceOp::Translate { dx, dy });
    }

    fn set_transform(&mut self, transform: Transform2D) {
        self.transform = transform;
        self.log(SurfaceOp::SetTransform(transform));
    }

    fn reset_affine(&mut self) {
        self.transform = Transform2D::identity();
        self.log(SurfaceOp::ResetAffine);
    }

    fn save(&mut self) {
        self.saved.push(SavedState {
            clip: self.clip,
            transform: self.transform,
        });
        self.log(SurfaceOp::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.clip = state.clip;
            self.transform = state.transform;
        } else {
            tracing::warn!("RecordingSurface::restore without matching save");
        }
        self.log(SurfaceOp::Restore);
    }
}

impl OffscreenSurface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.clip = Rect::from_size(width as f32, height as f32);
    }

    fn present(&mut self, target: &mut dyn Surface) {
        self.presented += 1;
        self.log(SurfaceOp::Present);
        target.set_clip(Rect::from_size(self.width as f32, self.height as f32));
        target.set_alpha(255);
        target.draw_image_scaled(
            &self.snapshot,
            Rect::from_size(self.width as f32, self.height as f32),
        );
    }
}
