//! The drawing surface capability
//!
//! [`Surface`] is the immediate-mode canvas a platform back end provides. The
//! asynchronous bridge never calls it from the UI thread: commands recorded
//! there are replayed against a `Surface` on the host's drawing thread.
//!
//! Paint state (`set_color`, `set_alpha`, `set_font`, `set_clip`) is sticky on
//! the surface until changed. Replayed commands always set the state they need
//! before drawing.

use crate::color::Color;
use crate::gradient::GradientFill;
use crate::image::{Font, Image, RgbData};
use crate::path::{Path, Point};
use crate::primitives::{ArcSegment, Rect};
use crate::stroke::Stroke;
use crate::transform::Transform2D;

pub trait Surface {
    // === Paint state ===

    /// Replace the clip with `clip` (in surface coordinates)
    fn set_clip(&mut self, clip: Rect);
    fn set_color(&mut self, color: Color);
    /// Paint alpha, 0 (transparent) to 255 (opaque)
    fn set_alpha(&mut self, alpha: u8);
    fn set_font(&mut self, font: &Font);

    // === Shapes ===

    fn fill_rect(&mut self, rect: Rect);
    fn draw_rect(&mut self, rect: Rect);
    fn fill_round_rect(&mut self, rect: Rect, arc_width: f32, arc_height: f32);
    fn draw_round_rect(&mut self, rect: Rect, arc_width: f32, arc_height: f32);
    fn fill_arc(&mut self, arc: ArcSegment);
    fn draw_arc(&mut self, arc: ArcSegment);
    fn draw_line(&mut self, from: Point, to: Point);
    fn fill_polygon(&mut self, points: &[Point]);
    fn draw_polygon(&mut self, points: &[Point]);
    fn fill_path(&mut self, path: &Path);
    fn draw_path(&mut self, path: &Path, stroke: &Stroke);
    fn fill_gradient(&mut self, gradient: &GradientFill, rect: Rect);

    // === Text and images ===

    fn draw_string(&mut self, text: &str, origin: Point);
    fn draw_image(&mut self, image: &Image, origin: Point);
    fn draw_image_scaled(&mut self, image: &Image, dest: Rect);
    /// Blit the `src` region of `image` into `dest`, scaling as needed
    fn draw_image_region(&mut self, image: &Image, src: Rect, dest: Rect);
    /// Repeat `image` over `dest`, tiles anchored at `dest`'s origin
    fn tile_image(&mut self, image: &Image, dest: Rect);
    fn draw_rgb(&mut self, data: &RgbData, origin: Point);

    // === Transforms ===

    /// Rotate by `angle` radians, around `pivot` when given
    fn rotate(&mut self, angle: f32, pivot: Option<Point>);
    fn scale(&mut self, sx: f32, sy: f32);
    fn translate(&mut self, dx: f32, dy: f32);
    fn set_transform(&mut self, transform: Transform2D);
    fn reset_affine(&mut self);
    /// Push transform and clip
    fn save(&mut self);
    /// Pop what the matching `save` pushed
    fn restore(&mut self);
}

/// A surface that renders off-screen and can later be copied onto another one.
///
/// Used when the host cannot draw straight onto its view, e.g. while the view
/// is hidden or a text editor overlays it.
pub trait OffscreenSurface: Surface {
    fn resize(&mut self, width: u32, height: u32);
    /// Copy the buffered pixels onto `target`
    fn present(&mut self, target: &mut dyn Surface);
}
