//! Rebase a shape so that shapes which differ only by position, rotation and
//! scale come out the same.
//!
//! Intended use is as a key to group shapes that are candidates for reuse; the
//! members of a group can then be related with [crate::affine_between].

use kurbo::{Affine, Point, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    geometry::{round_digits, AlmostEqual, ALMOST_EQUAL_TOLERANCE},
    path::CanonicalPath,
    shape::Shape,
    vectors::{first_significant, VecsIter},
};

const X_BASIS: Vec2 = Vec2::new(1.0, 0.0);

/// How much of the difference between shapes normalization erases.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Translation, rotation and uniform scale; a stretched shape stays visibly stretched
    #[default]
    Similarity,
    /// Also scale along y so the first vertical activity is 1. This removes mirroring
    /// and independent scaling of the axes, e.g. a square and a rect normalize the same.
    AxisScale,
}

/// <https://github.com/googlefonts/picosvg/blob/69cbfec486eca35a46187405abc39f608d3b2963/src/picosvg/svg_reuse.py#L141>
fn angle(v: Vec2) -> f64 {
    v.y.atan2(v.x)
}

/// Rotate then uniformly scale `from` onto `to`.
///
/// <https://github.com/googlefonts/picosvg/blob/69cbfec486eca35a46187405abc39f608d3b2963/src/picosvg/svg_reuse.py#L146>
pub(crate) fn affine_vec_to_vec(from: Vec2, to: Vec2) -> Affine {
    let rotate = Affine::rotate(angle(to) - angle(from));
    let vec = (rotate * from.to_point()).to_vec2();

    let scale = if !vec.hypot().almost_equals(0.0, ALMOST_EQUAL_TOLERANCE) {
        to.hypot() / vec.hypot()
    } else {
        0.0
    };
    Affine::scale(scale) * rotate
}

/// Shift the path so that drawing starts at the origin.
fn move_to_origin(path: &mut CanonicalPath) {
    if let Some(start) = path.first_move() {
        path.translate(-start.to_vec2());
    }
}

/// [normalize_with] using [Normalization::Similarity].
pub fn normalize(shape: &Shape, tolerance: f64) -> Result<CanonicalPath, Error> {
    normalize_with(shape, tolerance, Normalization::default())
}

/// Build a version of shape that compares == to equivalent shapes even if offset, scaled, rotated, etc.
///
/// Fails only if the shape itself is malformed.
///
/// <https://github.com/googlefonts/picosvg/blob/69cbfec486eca35a46187405abc39f608d3b2963/src/picosvg/svg_reuse.py#L240>
pub fn normalize_with(
    shape: &Shape,
    tolerance: f64,
    normalization: Normalization,
) -> Result<CanonicalPath, Error> {
    Ok(normalize_path(
        &shape.canonicalize()?,
        tolerance,
        normalization,
    ))
}

/// Normalize an already canonical path.
///
/// The reference vector is the first one that is significant relative to the
/// longest, so scaling the path, or normalizing it again, picks the same one.
///
/// Equivalent paths drawn from a different starting point, or in a different
/// direction, do *not* normalize the same.
pub fn normalize_path(
    path: &CanonicalPath,
    tolerance: f64,
    normalization: Normalization,
) -> CanonicalPath {
    let mut path = path.clone();

    // Always start at 0,0
    move_to_origin(&mut path);

    // Normalize first activity to [1 0]; eliminates rotation and uniform scaling
    let extent = largest(&path, Vec2::hypot);
    let first = (extent >= tolerance)
        .then(|| first_significant(VecsIter::new(&path), |vec| vec.hypot() / extent, tolerance))
        .flatten();
    let Some((_, vec_first)) = first else {
        debug!("{path} has no significant activity, normalizes to a point");
        return CanonicalPath::point(Point::ZERO);
    };
    if !vec_first.almost_equals(X_BASIS, ALMOST_EQUAL_TOLERANCE) {
        path.apply_affine(affine_vec_to_vec(vec_first, X_BASIS));
    }

    // Normalize first y activity to 1.0; eliminates mirroring and non-uniform scaling
    if normalization == Normalization::AxisScale {
        let extent_y = largest(&path, |vec| vec.y.abs());
        if extent_y >= tolerance {
            if let Some((_, vecy)) =
                first_significant(VecsIter::new(&path), |vec| vec.y / extent_y, tolerance)
            {
                if !vecy.y.almost_equals(1.0, ALMOST_EQUAL_TOLERANCE) {
                    path.apply_affine(Affine::scale_non_uniform(1.0, 1.0 / vecy.y));
                }
            }
        }
    }

    let ndigits = round_digits(tolerance);
    path.map_arcs(|arc| arc.canonical(ndigits)).round(ndigits)
}

/// The largest `val_fn` of any vector but the initial move.
fn largest(path: &CanonicalPath, val_fn: impl Fn(Vec2) -> f64) -> f64 {
    VecsIter::new(path)
        .skip(1)
        .map(val_fn)
        .fold(0.0, f64::max)
}
