//! Elliptical arc geometry.
//!
//! SVG describes arcs by their endpoints; comparing them needs points along the
//! arc, which needs the center parameterization.
//!
//! <https://www.w3.org/TR/SVG11/implnote.html#ArcConversionEndpointToCenter>

use std::f64::consts::TAU;

use kurbo::{Arc, Point, Vec2};

use crate::path::EllipticalArc;

/// The arc drawn by `arc` with the pen at `start`, in center parameterization.
///
/// None if SVG would draw a straight line instead: coincident endpoints or a zero radius.
pub(crate) fn center_parameterization(start: Point, arc: &EllipticalArc) -> Option<Arc> {
    let end = arc.end;
    let mut rx = arc.radii.x.abs();
    let mut ry = arc.radii.y.abs();
    if start == end || rx == 0.0 || ry == 0.0 {
        return None;
    }

    let x_rotation = arc.x_rotation.to_radians();
    let (sin_phi, cos_phi) = x_rotation.sin_cos();

    // F.6.5.1, half the chord in the frame of the ellipse
    let half_chord = (start - end) * 0.5;
    let x1 = cos_phi * half_chord.x + sin_phi * half_chord.y;
    let y1 = -sin_phi * half_chord.x + cos_phi * half_chord.y;

    // F.6.6.2, radii too small to span the chord grow until they just do
    let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    // F.6.5.2
    let (rx2, ry2, x12, y12) = (rx * rx, ry * ry, x1 * x1, y1 * y1);
    // Mathematically >= 0 but goes slightly negative when the chord is as long as
    // the ellipse is wide, e.g. half of a circle.
    let radicand = ((rx2 * ry2 - rx2 * y12 - ry2 * x12) / (rx2 * y12 + ry2 * x12)).max(0.0);
    let mut coef = radicand.sqrt();
    if arc.large_arc == arc.sweep {
        coef = -coef;
    }
    let cx1 = coef * rx * y1 / ry;
    let cy1 = -coef * ry * x1 / rx;

    // F.6.5.3
    let mid = start.midpoint(end);
    let center = Point::new(
        cos_phi * cx1 - sin_phi * cy1 + mid.x,
        sin_phi * cx1 + cos_phi * cy1 + mid.y,
    );

    // F.6.5.5 and F.6.5.6
    let u = Vec2::new((x1 - cx1) / rx, (y1 - cy1) / ry);
    let v = Vec2::new((-x1 - cx1) / rx, (-y1 - cy1) / ry);
    let start_angle = u.atan2();
    let mut sweep_angle = u.cross(v).atan2(u.dot(v));
    if arc.sweep && sweep_angle < 0.0 {
        sweep_angle += TAU;
    } else if !arc.sweep && sweep_angle > 0.0 {
        sweep_angle -= TAU;
    }

    Some(Arc {
        center,
        radii: Vec2::new(rx, ry),
        start_angle,
        sweep_angle,
        x_rotation,
    })
}

/// The point at `angle` on the full ellipse of `arc`.
fn point_at_angle(arc: &Arc, angle: f64) -> Point {
    let (sin_phi, cos_phi) = arc.x_rotation.sin_cos();
    let (sin, cos) = angle.sin_cos();
    let x = arc.radii.x * cos;
    let y = arc.radii.y * sin;
    arc.center + Vec2::new(cos_phi * x - sin_phi * y, sin_phi * x + cos_phi * y)
}

/// The point `t` of the way along the parametric sweep, `t` in [0, 1].
///
/// An affine map of an ellipse preserves parametric angle differences, so the
/// point at a given `t` follows the arc through any affine transform.
pub(crate) fn point_at(arc: &Arc, t: f64) -> Point {
    point_at_angle(arc, arc.start_angle + arc.sweep_angle * t)
}

/// The point on the arc farthest from its chord.
///
/// The tangent at the middle of the parametric sweep is parallel to the chord,
/// which makes it the apex.
pub(crate) fn apex(arc: &Arc) -> Point {
    point_at(arc, 0.5)
}

/// The vector from the apex of the arc down to the middle of its chord.
///
/// Zero for an arc SVG draws as a line.
pub(crate) fn sagitta(start: Point, arc: &EllipticalArc) -> Vec2 {
    match center_parameterization(start, arc) {
        Some(geometry) => start.midpoint(arc.end) - apex(&geometry),
        None => Vec2::ZERO,
    }
}
