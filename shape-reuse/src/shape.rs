//! The shapes we can compare, and how each becomes a [CanonicalPath].

use kurbo::{Point, Vec2};
use log::trace;
use serde::{Deserialize, Serialize};
use svgtypes::{PathParser, PathSegment};

use crate::{
    error::Error,
    path::{CanonicalPath, EllipticalArc, PathCommand},
};

/// A closed set of the SVG basic shapes plus path.
///
/// <https://www.w3.org/TR/SVG11/shapes.html>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Path {
        d: String,
    },
    Rect {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        width: f64,
        height: f64,
        /// Corner radii; if only one is given the other matches it
        #[serde(default)]
        rx: Option<f64>,
        #[serde(default)]
        ry: Option<f64>,
    },
    Circle {
        #[serde(default)]
        cx: f64,
        #[serde(default)]
        cy: f64,
        r: f64,
    },
    Ellipse {
        #[serde(default)]
        cx: f64,
        #[serde(default)]
        cy: f64,
        rx: f64,
        ry: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Polyline {
        points: Vec<Point>,
    },
    Polygon {
        points: Vec<Point>,
    },
}

impl Shape {
    pub fn path(d: impl Into<String>) -> Shape {
        Shape::Path { d: d.into() }
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            rx: None,
            ry: None,
        }
    }

    pub fn rounded_rect(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rx: Option<f64>,
        ry: Option<f64>,
    ) -> Shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            rx,
            ry,
        }
    }

    pub fn circle(cx: f64, cy: f64, r: f64) -> Shape {
        Shape::Circle { cx, cy, r }
    }

    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Shape {
        Shape::Ellipse { cx, cy, rx, ry }
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Shape {
        Shape::Line { x1, y1, x2, y2 }
    }

    pub fn polyline(points: impl IntoIterator<Item = impl Into<Point>>) -> Shape {
        Shape::Polyline {
            points: points.into_iter().map(Into::into).collect(),
        }
    }

    pub fn polygon(points: impl IntoIterator<Item = impl Into<Point>>) -> Shape {
        Shape::Polygon {
            points: points.into_iter().map(Into::into).collect(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Shape::Path { .. } => "path",
            Shape::Rect { .. } => "rect",
            Shape::Circle { .. } => "circle",
            Shape::Ellipse { .. } => "ellipse",
            Shape::Line { .. } => "line",
            Shape::Polyline { .. } => "polyline",
            Shape::Polygon { .. } => "polygon",
        }
    }

    /// The equivalent path in affine-friendly form.
    ///
    /// Every coordinate is absolute, shorthand (H, V, S, T) is spelled out and every
    /// subpath begins with exactly one move. Fails only if the shape is malformed.
    pub fn canonicalize(&self) -> Result<CanonicalPath, Error> {
        let path = match self {
            Shape::Path { d } => canonicalize_svg_path(d)?,
            Shape::Rect {
                x,
                y,
                width,
                height,
                rx,
                ry,
            } => {
                let x = self.coord("x", *x)?;
                let y = self.coord("y", *y)?;
                let width = self.length("width", *width)?;
                let height = self.length("height", *height)?;
                let rx = rx.map(|v| self.length("rx", v)).transpose()?;
                let ry = ry.map(|v| self.length("ry", v)).transpose()?;
                rect_path(x, y, width, height, rx, ry)
            }
            Shape::Circle { cx, cy, r } => {
                let r = self.length("r", *r)?;
                ellipse_path(self.coord("cx", *cx)?, self.coord("cy", *cy)?, r, r)
            }
            Shape::Ellipse { cx, cy, rx, ry } => ellipse_path(
                self.coord("cx", *cx)?,
                self.coord("cy", *cy)?,
                self.length("rx", *rx)?,
                self.length("ry", *ry)?,
            ),
            Shape::Line { x1, y1, x2, y2 } => {
                let mut builder = CanonicalPathBuilder::default();
                builder.move_to(Point::new(self.coord("x1", *x1)?, self.coord("y1", *y1)?));
                builder.line_to(Point::new(self.coord("x2", *x2)?, self.coord("y2", *y2)?));
                builder.build()
            }
            Shape::Polyline { points } => poly_path(self.points(points)?, false),
            Shape::Polygon { points } => poly_path(self.points(points)?, true),
        };
        // finite attributes can still add up to infinity
        if !path.commands().iter().all(PathCommand::is_finite) {
            return Err(Error::NonFiniteGeometry { kind: self.kind() });
        }
        trace!("{} canonicalized to {path}", self.kind());
        Ok(path)
    }

    fn coord(&self, attribute: &'static str, value: f64) -> Result<f64, Error> {
        if !value.is_finite() {
            return Err(Error::InvalidShape {
                kind: self.kind(),
                attribute,
                value,
            });
        }
        Ok(value)
    }

    fn length(&self, attribute: &'static str, value: f64) -> Result<f64, Error> {
        if self.coord(attribute, value)? < 0.0 {
            return Err(Error::InvalidShape {
                kind: self.kind(),
                attribute,
                value,
            });
        }
        Ok(value)
    }

    fn points<'a>(&self, points: &'a [Point]) -> Result<&'a [Point], Error> {
        for p in points {
            self.coord("points", p.x)?;
            self.coord("points", p.y)?;
        }
        Ok(points)
    }
}

/// Convenience for `shape.canonicalize()`.
pub fn canonicalize(shape: &Shape) -> Result<CanonicalPath, Error> {
    shape.canonicalize()
}

/// Accumulates absolute commands, keeping track of where the pen is.
#[derive(Debug, Default)]
struct CanonicalPathBuilder {
    commands: Vec<PathCommand>,
    current: Point,
    subpath_start: Point,
    // drawing after a close implicitly starts over at the subpath start
    closed: bool,
}

impl CanonicalPathBuilder {
    fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn current(&self) -> Point {
        self.current
    }

    fn move_to(&mut self, p: Point) {
        // a move right after a move leaves an empty subpath, which draws nothing
        match self.commands.last_mut() {
            Some(PathCommand::MoveTo(last)) => *last = p,
            _ => self.commands.push(PathCommand::MoveTo(p)),
        }
        self.current = p;
        self.subpath_start = p;
        self.closed = false;
    }

    fn begin_segment(&mut self) {
        if self.closed {
            self.commands.push(PathCommand::MoveTo(self.subpath_start));
            self.closed = false;
        }
    }

    fn line_to(&mut self, p: Point) {
        self.begin_segment();
        self.commands.push(PathCommand::LineTo(p));
        self.current = p;
    }

    fn quad_to(&mut self, p0: Point, p1: Point) {
        self.begin_segment();
        self.commands.push(PathCommand::QuadTo(p0, p1));
        self.current = p1;
    }

    fn curve_to(&mut self, p0: Point, p1: Point, p2: Point) {
        self.begin_segment();
        self.commands.push(PathCommand::CurveTo(p0, p1, p2));
        self.current = p2;
    }

    fn arc_to(&mut self, radii: Vec2, x_rotation: f64, large_arc: bool, sweep: bool, end: Point) {
        self.begin_segment();
        self.commands.push(PathCommand::ArcTo(EllipticalArc {
            radii: Vec2::new(radii.x.abs(), radii.y.abs()),
            x_rotation,
            large_arc,
            sweep,
            end,
        }));
        self.current = end;
    }

    fn close_path(&mut self) {
        self.commands.push(PathCommand::ClosePath);
        self.current = self.subpath_start;
        self.closed = true;
    }

    fn build(self) -> CanonicalPath {
        CanonicalPath::from_commands(self.commands)
    }
}

/// Reflect the previous control point about the pen, or use the pen if there is none.
///
/// <https://www.w3.org/TR/SVG11/paths.html#PathDataCubicBezierCommands>
fn reflect(prev_ctrl: Option<Point>, about: Point) -> Point {
    prev_ctrl.map(|ctrl| about + (about - ctrl)).unwrap_or(about)
}

fn canonicalize_svg_path(d: &str) -> Result<CanonicalPath, Error> {
    let invalid = |reason: String| Error::InvalidPath {
        d: d.to_string(),
        reason,
    };

    let mut builder = CanonicalPathBuilder::default();
    // control points of the previous segment, for S and T
    let mut prev_cubic_ctrl: Option<Point> = None;
    let mut prev_quad_ctrl: Option<Point> = None;

    for segment in PathParser::from(d) {
        let segment = segment.map_err(|e| invalid(e.to_string()))?;
        if builder.is_empty() && !matches!(segment, PathSegment::MoveTo { .. }) {
            return Err(invalid("should start with a move".to_string()));
        }

        let current = builder.current();
        let resolve = |abs: bool, x: f64, y: f64| {
            if abs {
                Point::new(x, y)
            } else {
                current + Vec2::new(x, y)
            }
        };
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        match segment {
            PathSegment::MoveTo { abs, x, y } => builder.move_to(resolve(abs, x, y)),
            PathSegment::LineTo { abs, x, y } => builder.line_to(resolve(abs, x, y)),
            PathSegment::HorizontalLineTo { abs, x } => {
                let x = if abs { x } else { current.x + x };
                builder.line_to(Point::new(x, current.y));
            }
            PathSegment::VerticalLineTo { abs, y } => {
                let y = if abs { y } else { current.y + y };
                builder.line_to(Point::new(current.x, y));
            }
            PathSegment::CurveTo {
                abs,
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                let ctrl2 = resolve(abs, x2, y2);
                builder.curve_to(resolve(abs, x1, y1), ctrl2, resolve(abs, x, y));
                cubic_ctrl = Some(ctrl2);
            }
            PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                let ctrl2 = resolve(abs, x2, y2);
                builder.curve_to(
                    reflect(prev_cubic_ctrl, current),
                    ctrl2,
                    resolve(abs, x, y),
                );
                cubic_ctrl = Some(ctrl2);
            }
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                let ctrl = resolve(abs, x1, y1);
                builder.quad_to(ctrl, resolve(abs, x, y));
                quad_ctrl = Some(ctrl);
            }
            PathSegment::SmoothQuadratic { abs, x, y } => {
                let ctrl = reflect(prev_quad_ctrl, current);
                builder.quad_to(ctrl, resolve(abs, x, y));
                quad_ctrl = Some(ctrl);
            }
            PathSegment::EllipticalArc {
                abs,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
            } => builder.arc_to(
                Vec2::new(rx, ry),
                x_axis_rotation,
                large_arc,
                sweep,
                resolve(abs, x, y),
            ),
            PathSegment::ClosePath { .. } => builder.close_path(),
        }

        prev_cubic_ctrl = cubic_ctrl;
        prev_quad_ctrl = quad_ctrl;
    }

    let path = builder.build();
    if !path.commands().iter().all(PathCommand::is_finite) {
        return Err(invalid("coordinates must be finite".to_string()));
    }
    Ok(path)
}

/// <https://www.w3.org/TR/SVG11/shapes.html#RectElement>
fn rect_path(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rx: Option<f64>,
    ry: Option<f64>,
) -> CanonicalPath {
    let (rx, ry) = match (rx, ry) {
        (Some(rx), Some(ry)) => (rx, ry),
        (Some(r), None) | (None, Some(r)) => (r, r),
        (None, None) => (0.0, 0.0),
    };
    let rx = rx.min(width / 2.0);
    let ry = ry.min(height / 2.0);

    let mut builder = CanonicalPathBuilder::default();
    if rx == 0.0 || ry == 0.0 {
        builder.move_to(Point::new(x, y));
        builder.line_to(Point::new(x + width, y));
        builder.line_to(Point::new(x + width, y + height));
        builder.line_to(Point::new(x, y + height));
        builder.close_path();
        return builder.build();
    }

    let radii = Vec2::new(rx, ry);
    builder.move_to(Point::new(x + rx, y));
    builder.line_to(Point::new(x + width - rx, y));
    builder.arc_to(radii, 0.0, false, true, Point::new(x + width, y + ry));
    builder.line_to(Point::new(x + width, y + height - ry));
    builder.arc_to(radii, 0.0, false, true, Point::new(x + width - rx, y + height));
    builder.line_to(Point::new(x + rx, y + height));
    builder.arc_to(radii, 0.0, false, true, Point::new(x, y + height - ry));
    builder.line_to(Point::new(x, y + ry));
    builder.arc_to(radii, 0.0, false, true, Point::new(x + rx, y));
    builder.close_path();
    builder.build()
}

/// Two half-ellipse arcs; a single arc cannot start and end at the same point.
fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> CanonicalPath {
    let radii = Vec2::new(rx, ry);
    let mut builder = CanonicalPathBuilder::default();
    builder.move_to(Point::new(cx - rx, cy));
    builder.arc_to(radii, 0.0, true, true, Point::new(cx + rx, cy));
    builder.arc_to(radii, 0.0, true, true, Point::new(cx - rx, cy));
    builder.close_path();
    builder.build()
}

fn poly_path(points: &[Point], close: bool) -> CanonicalPath {
    let mut builder = CanonicalPathBuilder::default();
    let Some((first, rest)) = points.split_first() else {
        return builder.build();
    };
    builder.move_to(*first);
    for p in rest {
        builder.line_to(*p);
    }
    if close {
        builder.close_path();
    }
    builder.build()
}
