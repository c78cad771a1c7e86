//! Absolute-coordinate path commands, the common currency of reuse detection.
//!
//! Unlike [kurbo::PathEl] elliptical arcs are retained as arcs so that a circle
//! compares as a circle rather than as whatever cubics approximate it.

use std::fmt::{self, Display};

use kurbo::{Affine, Ellipse, Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::geometry::{round_pt, round_scalar, round_vec2, AlmostEqual};

/// An SVG elliptical arc, drawn from wherever the pen currently is to `end`.
///
/// <https://www.w3.org/TR/SVG11/paths.html#PathDataEllipticalArcCommands>
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipticalArc {
    pub radii: Vec2,
    /// Rotation of the ellipse x-axis, in degrees
    pub x_rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub end: Point,
}

impl EllipticalArc {
    /// The arc mapped through `affine`.
    ///
    /// The start point is not part of the arc so the caller maps it separately.
    pub fn transform(&self, affine: Affine) -> EllipticalArc {
        let [a, b, c, d, _, _] = affine.as_coeffs();
        let linear = Affine::new([a, b, c, d, 0.0, 0.0]);
        let ellipse = linear * Ellipse::new(Point::ZERO, self.radii, self.x_rotation.to_radians());
        let (radii, x_rotation) = ellipse.radii_and_rotation();
        EllipticalArc {
            radii,
            x_rotation: x_rotation.to_degrees(),
            large_arc: self.large_arc,
            // a mirror image sweeps the other way
            sweep: if linear.determinant() < 0.0 {
                !self.sweep
            } else {
                self.sweep
            },
            end: affine * self.end,
        }
    }

    /// A unique spelling of the ellipse, rounded to `ndigits`.
    ///
    /// `A2 1 90 ...` and `A1 2 0 ...` describe the same ellipse, as do rotations
    /// 30 and 210. We settle on rx >= ry, rotation in [0, 180), and no rotation
    /// at all for a circle.
    pub(crate) fn canonical(&self, ndigits: u32) -> EllipticalArc {
        let mut radii = Vec2::new(self.radii.x.abs(), self.radii.y.abs());
        let mut x_rotation = self.x_rotation;
        if radii.x < radii.y {
            radii = Vec2::new(radii.y, radii.x);
            x_rotation += 90.0;
        }
        let radii = round_vec2(radii, ndigits);
        let mut x_rotation = round_scalar(x_rotation.rem_euclid(180.0), ndigits);
        if x_rotation == 180.0 || radii.x == radii.y {
            x_rotation = 0.0;
        }
        EllipticalArc {
            radii,
            x_rotation,
            end: round_pt(self.end, ndigits),
            ..*self
        }
    }

    fn round(&self, ndigits: u32) -> EllipticalArc {
        EllipticalArc {
            radii: round_vec2(self.radii, ndigits),
            x_rotation: round_scalar(self.x_rotation, ndigits),
            end: round_pt(self.end, ndigits),
            ..*self
        }
    }

    fn is_finite(&self) -> bool {
        self.radii.is_finite() && self.x_rotation.is_finite() && self.end.is_finite()
    }
}

impl AlmostEqual for &EllipticalArc {
    fn almost_equals(self, other: Self, tolerance: f64) -> bool {
        self.large_arc == other.large_arc
            && self.sweep == other.sweep
            && self.radii.almost_equals(other.radii, tolerance)
            && self.x_rotation.almost_equals(other.x_rotation, tolerance)
            && self.end.almost_equals(other.end, tolerance)
    }
}

/// A single drawing command, always in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CurveTo(Point, Point, Point),
    ArcTo(EllipticalArc),
    ClosePath,
}

impl PathCommand {
    /// Where the pen is left by this command, None for close.
    pub fn end_point(&self) -> Option<Point> {
        match self {
            PathCommand::MoveTo(p)
            | PathCommand::LineTo(p)
            | PathCommand::QuadTo(_, p)
            | PathCommand::CurveTo(_, _, p) => Some(*p),
            PathCommand::ArcTo(arc) => Some(arc.end),
            PathCommand::ClosePath => None,
        }
    }

    /// True if both commands draw the same kind of segment, whatever the coordinates.
    pub fn same_kind(&self, other: &PathCommand) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn transform(&self, affine: Affine) -> PathCommand {
        match self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(affine * *p),
            PathCommand::LineTo(p) => PathCommand::LineTo(affine * *p),
            PathCommand::QuadTo(p0, p1) => PathCommand::QuadTo(affine * *p0, affine * *p1),
            PathCommand::CurveTo(p0, p1, p2) => {
                PathCommand::CurveTo(affine * *p0, affine * *p1, affine * *p2)
            }
            PathCommand::ArcTo(arc) => PathCommand::ArcTo(arc.transform(affine)),
            PathCommand::ClosePath => PathCommand::ClosePath,
        }
    }

    fn translate(&self, offset: Vec2) -> PathCommand {
        match self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(*p + offset),
            PathCommand::LineTo(p) => PathCommand::LineTo(*p + offset),
            PathCommand::QuadTo(p0, p1) => PathCommand::QuadTo(*p0 + offset, *p1 + offset),
            PathCommand::CurveTo(p0, p1, p2) => {
                PathCommand::CurveTo(*p0 + offset, *p1 + offset, *p2 + offset)
            }
            PathCommand::ArcTo(arc) => PathCommand::ArcTo(EllipticalArc {
                end: arc.end + offset,
                ..*arc
            }),
            PathCommand::ClosePath => PathCommand::ClosePath,
        }
    }

    fn round(&self, ndigits: u32) -> PathCommand {
        match self {
            PathCommand::MoveTo(p) => PathCommand::MoveTo(round_pt(*p, ndigits)),
            PathCommand::LineTo(p) => PathCommand::LineTo(round_pt(*p, ndigits)),
            PathCommand::QuadTo(p0, p1) => {
                PathCommand::QuadTo(round_pt(*p0, ndigits), round_pt(*p1, ndigits))
            }
            PathCommand::CurveTo(p0, p1, p2) => PathCommand::CurveTo(
                round_pt(*p0, ndigits),
                round_pt(*p1, ndigits),
                round_pt(*p2, ndigits),
            ),
            PathCommand::ArcTo(arc) => PathCommand::ArcTo(arc.round(ndigits)),
            PathCommand::ClosePath => PathCommand::ClosePath,
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p.is_finite(),
            PathCommand::QuadTo(p0, p1) => p0.is_finite() && p1.is_finite(),
            PathCommand::CurveTo(p0, p1, p2) => p0.is_finite() && p1.is_finite() && p2.is_finite(),
            PathCommand::ArcTo(arc) => arc.is_finite(),
            PathCommand::ClosePath => true,
        }
    }
}

impl AlmostEqual for &PathCommand {
    fn almost_equals(self, other: Self, tolerance: f64) -> bool {
        match (self, other) {
            (PathCommand::MoveTo(sp0), PathCommand::MoveTo(op0)) => {
                sp0.almost_equals(*op0, tolerance)
            }
            (PathCommand::LineTo(sp0), PathCommand::LineTo(op0)) => {
                sp0.almost_equals(*op0, tolerance)
            }
            (PathCommand::QuadTo(sp0, sp1), PathCommand::QuadTo(op0, op1)) => {
                sp0.almost_equals(*op0, tolerance) && sp1.almost_equals(*op1, tolerance)
            }
            (PathCommand::CurveTo(sp0, sp1, sp2), PathCommand::CurveTo(op0, op1, op2)) => {
                sp0.almost_equals(*op0, tolerance)
                    && sp1.almost_equals(*op1, tolerance)
                    && sp2.almost_equals(*op2, tolerance)
            }
            (PathCommand::ArcTo(sa), PathCommand::ArcTo(oa)) => sa.almost_equals(oa, tolerance),
            (PathCommand::ClosePath, PathCommand::ClosePath) => true,
            _ => {
                debug_assert!(
                    !self.same_kind(other),
                    "Missing case for {self:?}, {other:?}?"
                );
                false
            }
        }
    }
}

impl Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathCommand::MoveTo(p) => write!(f, "M{},{}", p.x, p.y),
            PathCommand::LineTo(p) => write!(f, "L{},{}", p.x, p.y),
            PathCommand::QuadTo(p0, p1) => write!(f, "Q{},{} {},{}", p0.x, p0.y, p1.x, p1.y),
            PathCommand::CurveTo(p0, p1, p2) => write!(
                f,
                "C{},{} {},{} {},{}",
                p0.x, p0.y, p1.x, p1.y, p2.x, p2.y
            ),
            PathCommand::ArcTo(arc) => write!(
                f,
                "A{} {} {} {} {} {},{}",
                arc.radii.x,
                arc.radii.y,
                arc.x_rotation,
                arc.large_arc as u8,
                arc.sweep as u8,
                arc.end.x,
                arc.end.y
            ),
            PathCommand::ClosePath => write!(f, "Z"),
        }
    }
}

/// A path whose every command is absolute and whose every subpath starts with one move.
///
/// Produced by [crate::Shape::canonicalize]. Replaying the commands from a pen at
/// the origin draws exactly the geometry of the shape it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPath(Vec<PathCommand>);

impl CanonicalPath {
    pub(crate) fn from_commands(commands: Vec<PathCommand>) -> CanonicalPath {
        CanonicalPath(commands)
    }

    /// The path that draws nothing but a single point.
    pub fn point(at: Point) -> CanonicalPath {
        CanonicalPath(vec![PathCommand::MoveTo(at)])
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first waypoint, where drawing begins.
    pub fn first_move(&self) -> Option<Point> {
        match self.0.first() {
            Some(PathCommand::MoveTo(p)) => Some(*p),
            _ => None,
        }
    }

    /// True if both paths are drawn with the same sequence of command kinds.
    ///
    /// Paths that fail this can never be affine transformations of one another.
    pub fn same_topology(&self, other: &CanonicalPath) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(c1, c2)| c1.same_kind(c2))
    }

    pub fn apply_affine(&mut self, affine: Affine) {
        for command in self.0.iter_mut() {
            *command = command.transform(affine);
        }
    }

    pub fn transformed(&self, affine: Affine) -> CanonicalPath {
        let mut path = self.clone();
        path.apply_affine(affine);
        path
    }

    /// Shift every point by `offset`.
    ///
    /// Arc radii and rotation are untouched, unlike `apply_affine` which has to
    /// recompute them.
    pub fn translate(&mut self, offset: Vec2) {
        for command in self.0.iter_mut() {
            *command = command.translate(offset);
        }
    }

    /// Round every number in the path to `ndigits` decimal digits.
    pub fn round(&self, ndigits: u32) -> CanonicalPath {
        CanonicalPath(self.0.iter().map(|c| c.round(ndigits)).collect())
    }

    /// Absolute SVG path data, e.g. `M0,0 L1,0 Z`.
    pub fn to_svg(&self) -> String {
        self.to_string()
    }

    pub(crate) fn map_arcs(&self, f: impl Fn(&EllipticalArc) -> EllipticalArc) -> CanonicalPath {
        CanonicalPath(
            self.0
                .iter()
                .map(|c| match c {
                    PathCommand::ArcTo(arc) => PathCommand::ArcTo(f(arc)),
                    _ => *c,
                })
                .collect(),
        )
    }
}

impl AlmostEqual for &CanonicalPath {
    fn almost_equals(self, other: Self, tolerance: f64) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(c1, c2)| c1.almost_equals(c2, tolerance))
    }
}

impl Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{command}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a CanonicalPath {
    type Item = &'a PathCommand;
    type IntoIter = std::slice::Iter<'a, PathCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
