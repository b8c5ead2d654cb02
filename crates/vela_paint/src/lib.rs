//! Vela Paint API
//!
//! The drawing vocabulary shared by the producer and consumer sides of the
//! asynchronous rendering bridge.
//!
//! # Features
//!
//! - Geometry primitives (points, rects, arc segments)
//! - Paths, strokes, gradients and affine transforms
//! - Shared image, raw RGB and font handles
//! - The [`Surface`] capability trait implemented by platform canvases
//! - A [`RecordingSurface`] for headless tests

pub mod color;
pub mod gradient;
pub mod image;
pub mod path;
pub mod primitives;
pub mod recording;
pub mod stroke;
pub mod surface;
pub mod transform;

pub use color::Color;
pub use gradient::{GradientDirection, GradientFill};
pub use image::{Font, FontWeight, Image, RgbData};
pub use path::{Path, PathBuilder, PathCommand, Point};
pub use primitives::*;
pub use recording::{RecordingSurface, SurfaceCall, SurfaceOp};
pub use stroke::{LineCap, LineJoin, Stroke};
pub use surface::{OffscreenSurface, Surface};
pub use transform::Transform2D;
