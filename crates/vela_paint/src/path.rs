//! Points and path outlines

use smallvec::SmallVec;

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One segment of a [`Path`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo {
        control: Point,
        end: Point,
    },
    CubicTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
    /// Circular arc; angles in degrees, counter-clockwise
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        sweep_angle: f32,
    },
    Close,
}

/// An owned shape outline, filled or stroked by the surface
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: SmallVec<[PathCommand; 16]>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Closed polygon through `points`
    pub fn polygon(points: &[Point]) -> Self {
        let mut builder = PathBuilder::new();
        let mut iter = points.iter().copied();
        if let Some(first) = iter.next() {
            builder = builder.move_to(first);
            for point in iter {
                builder = builder.line_to(point);
            }
            builder = builder.close();
        }
        builder.build()
    }
}

/// Chained construction of a [`Path`]
#[derive(Debug, Default)]
pub struct PathBuilder {
    path: Path,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(self, point: Point) -> Self {
        self.push(PathCommand::MoveTo(point))
    }

    pub fn line_to(self, point: Point) -> Self {
        self.push(PathCommand::LineTo(point))
    }

    pub fn quad_to(self, control: Point, end: Point) -> Self {
        self.push(PathCommand::QuadTo { control, end })
    }

    pub fn cubic_to(self, control1: Point, control2: Point, end: Point) -> Self {
        self.push(PathCommand::CubicTo {
            control1,
            control2,
            end,
        })
    }

    pub fn arc(self, center: Point, radius: f32, start_angle: f32, sweep_angle: f32) -> Self {
        self.push(PathCommand::Arc {
            center,
            radius,
            start_angle,
            sweep_angle,
        })
    }

    pub fn close(self) -> Self {
        self.push(PathCommand::Close)
    }

    pub fn build(self) -> Path {
        self.path
    }

    fn push(mut self, command: PathCommand) -> Self {
        self.path.commands.push(command);
        self
    }
}
