//! Gradient fills

use crate::color::Color;

/// Direction of a two-color linear gradient
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientDirection {
    Horizontal,
    Vertical,
}

/// A two-color gradient painted into a rectangle
///
/// The surface decides how the gradient is rasterised; the fill rect is passed
/// separately so the same description can be reused at different positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientFill {
    Linear {
        start: Color,
        end: Color,
        direction: GradientDirection,
    },
    /// Radial gradient centered in the fill rect, reaching its edges
    Radial { start: Color, end: Color },
    /// Radial gradient with a center and radius relative to the fill rect
    /// (0.0-1.0 of width/height), covering the whole rect
    RectRadial {
        start: Color,
        end: Color,
        relative_x: f32,
        relative_y: f32,
        relative_size: f32,
    },
}

impl GradientFill {
    pub fn linear(start: Color, end: Color, horizontal: bool) -> Self {
        GradientFill::Linear {
            start,
            end,
            direction: if horizontal {
                GradientDirection::Horizontal
            } else {
                GradientDirection::Vertical
            },
        }
    }

    pub fn radial(start: Color, end: Color) -> Self {
        GradientFill::Radial { start, end }
    }

    pub fn start_color(&self) -> Color {
        match *self {
            GradientFill::Linear { start, .. }
            | GradientFill::Radial { start, .. }
            | GradientFill::RectRadial { start, .. } => start,
        }
    }
}
