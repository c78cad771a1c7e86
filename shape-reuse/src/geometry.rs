//! Tolerant comparison and rounding of kurbo types.

use kurbo::{Affine, Point, Vec2};

/// Tolerance for "is this already exactly what we want" checks, not for shape comparison.
pub(crate) const ALMOST_EQUAL_TOLERANCE: f64 = 1e-9;

/// The most decimal digits we will ever round to.
pub const MAX_ROUND_DIGITS: u32 = 12;

/// <https://github.com/googlefonts/picosvg/blob/69cbfec486eca35a46187405abc39f608d3b2963/src/picosvg/geometric_types.py#L23>
pub(crate) trait AlmostEqual {
    fn almost_equals(self, other: Self, tolerance: f64) -> bool;
}

impl AlmostEqual for f64 {
    #[inline]
    fn almost_equals(self, other: Self, tolerance: f64) -> bool {
        (self - other).abs() <= tolerance
    }
}

impl AlmostEqual for Vec2 {
    #[inline]
    fn almost_equals(self, other: Self, tolerance: f64) -> bool {
        self.x.almost_equals(other.x, tolerance) && self.y.almost_equals(other.y, tolerance)
    }
}

impl AlmostEqual for Point {
    #[inline]
    fn almost_equals(self, other: Self, tolerance: f64) -> bool {
        self.x.almost_equals(other.x, tolerance) && self.y.almost_equals(other.y, tolerance)
    }
}

/// How many decimal digits survive rounding at a given tolerance.
///
/// Coarser tolerance keeps fewer digits: 0.1 keeps 1, 0.01 keeps 2, 1 or more keeps none.
pub fn round_digits(tolerance: f64) -> u32 {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return MAX_ROUND_DIGITS;
    }
    // the nudge stops 0.1 from coming out as 1.0000000000000002 digits
    let digits = (-tolerance.log10() - 1e-9).ceil();
    digits.clamp(0.0, MAX_ROUND_DIGITS as f64) as u32
}

pub(crate) fn round_scalar(v: f64, ndigits: u32) -> f64 {
    let mul = 10f64.powi(ndigits as i32);
    let result = (v * mul).round() / mul;
    // -0.0 is rarely useful
    if result == 0.0 {
        0.0
    } else {
        result
    }
}

pub(crate) fn round_pt(pt: Point, ndigits: u32) -> Point {
    Point::new(round_scalar(pt.x, ndigits), round_scalar(pt.y, ndigits))
}

pub(crate) fn round_vec2(vec: Vec2, ndigits: u32) -> Vec2 {
    Vec2::new(round_scalar(vec.x, ndigits), round_scalar(vec.y, ndigits))
}

/// Round every coefficient of `affine` to `ndigits` decimal digits.
pub fn round_affine(affine: Affine, ndigits: u32) -> Affine {
    let mut coeffs = affine.as_coeffs();
    for v in coeffs.iter_mut() {
        *v = round_scalar(*v, ndigits);
    }
    Affine::new(coeffs)
}
