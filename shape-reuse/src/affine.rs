//! Find the affine transform, if any, that turns one shape into another.

use std::ops::RangeInclusive;

use kurbo::{Affine, Point, Vec2};
use log::{debug, trace};

use crate::{
    arc::{center_parameterization, point_at},
    error::Error,
    geometry::{round_affine, AlmostEqual},
    path::{CanonicalPath, PathCommand},
    shape::Shape,
    vectors::vectors,
};

/// Decimal digits tried, fewest first, when rounding a transform that works.
pub const AFFINE_ROUND_DIGITS: RangeInclusive<u32> = 3..=12;

/// Fractions of the sweep at which arcs are compared, in addition to their end.
///
/// Together with the start and end these are five points, enough to pin down a conic.
const ARC_SAMPLES: [f64; 3] = [0.25, 0.5, 0.75];

/// Most basis pairs checked against the whole path before giving up.
const MAX_BASIS_ATTEMPTS: usize = 8;

/// Combines affines in logical order, e.g. "do [0] then [1] then [2]".
///
/// Using * you end up writing everything backwards, e.g. to move then rotate
/// you would rotate * move (rotate *of* move)
///
/// <https://github.com/googlefonts/picosvg/blob/69cbfec486eca35a46187405abc39f608d3b2963/src/picosvg/svg_transform.py#L187-L193>
fn combine_ltr(affines: &[Affine]) -> Affine {
    affines
        .iter()
        .rev()
        .copied()
        .reduce(|acc, e| acc * e)
        .unwrap_or(Affine::IDENTITY)
}

/// Every absolute point that pins down where each command draws.
///
/// Arcs contribute their end and points along the sweep; radii and flags alone
/// don't say where the curve actually goes.
fn command_points(path: &CanonicalPath) -> Vec<Vec<Point>> {
    let mut curr_pos = Point::ZERO;
    let mut subpath_start = Point::ZERO;
    path.commands()
        .iter()
        .map(|command| {
            let points = match command {
                PathCommand::MoveTo(p) => {
                    subpath_start = *p;
                    vec![*p]
                }
                PathCommand::LineTo(p) => vec![*p],
                PathCommand::QuadTo(p0, p1) => vec![*p0, *p1],
                PathCommand::CurveTo(p0, p1, p2) => vec![*p0, *p1, *p2],
                PathCommand::ArcTo(arc) => {
                    let mut points = vec![arc.end];
                    if let Some(geometry) = center_parameterization(curr_pos, arc) {
                        points.extend(ARC_SAMPLES.iter().map(|t| point_at(&geometry, *t)));
                    }
                    points
                }
                PathCommand::ClosePath => Vec::new(),
            };
            curr_pos = command.end_point().unwrap_or(subpath_start);
            points
        })
        .collect()
}

/// Does `affine` take every point of s1 to within `tolerance` of its counterpart in s2?
///
/// Arcs are sampled in the space of s1 and the samples mapped; an affine map
/// of an ellipse keeps the parametric position of each point.
fn try_affine_between(
    affine: Affine,
    s1_points: &[Vec<Point>],
    s2_points: &[Vec<Point>],
    tolerance: f64,
) -> bool {
    s1_points.len() == s2_points.len()
        && s1_points.iter().zip(s2_points).all(|(c1, c2)| {
            c1.len() == c2.len()
                && c1
                    .iter()
                    .zip(c2)
                    .all(|(p1, p2)| (affine * *p1).almost_equals(*p2, tolerance))
        })
}

/// Is the pair usable as a basis, i.e. are both long enough and far from parallel?
fn is_basis(v1: Vec2, v2: Vec2, tolerance: f64) -> bool {
    v1.hypot() >= tolerance && v2.hypot() >= tolerance && v1.cross(v2).abs() >= tolerance
}

/// Index pairs, skipping the initial move, that form a basis on both sides.
fn basis_pairs<'a>(
    s1_vecs: &'a [Vec2],
    s2_vecs: &'a [Vec2],
    tolerance: f64,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let n = s1_vecs.len().min(s2_vecs.len());
    (1..n)
        .flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
        .filter(move |(i, j)| {
            is_basis(s1_vecs[*i], s1_vecs[*j], tolerance)
                && is_basis(s2_vecs[*i], s2_vecs[*j], tolerance)
        })
}

/// Length of the longest vector, skipping the initial move.
fn extent(vecs: &[Vec2]) -> f64 {
    vecs.iter().skip(1).map(|v| v.hypot()).fold(0.0, f64::max)
}

/// Index of the highest score; ties go to the earliest.
fn first_max(scores: impl Iterator<Item = (usize, f64)>) -> Option<usize> {
    scores
        .fold(None, |best: Option<(usize, f64)>, (k, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((k, score)),
        })
        .map(|(k, _)| k)
}

/// The basis pair least sensitive to noise, measured relative to the size of each shape.
///
/// The anchor is the vector that is longest on both sides; its partner is the one
/// furthest from parallel to it on both sides. Treats both shapes alike, so
/// swapping them picks the same pair.
fn best_conditioned_pair(
    s1_vecs: &[Vec2],
    s2_vecs: &[Vec2],
    tolerance: f64,
) -> Option<(usize, usize)> {
    let n = s1_vecs.len().min(s2_vecs.len());
    let (ext1, ext2) = (extent(s1_vecs), extent(s2_vecs));
    if ext1 == 0.0 || ext2 == 0.0 {
        return None;
    }

    let anchor = first_max(
        (1..n)
            .filter(|k| s1_vecs[*k].hypot() >= tolerance && s2_vecs[*k].hypot() >= tolerance)
            .map(|k| (k, (s1_vecs[k].hypot() / ext1).min(s2_vecs[k].hypot() / ext2))),
    )?;
    let (a1, a2) = (s1_vecs[anchor], s2_vecs[anchor]);
    let partner = first_max(
        (1..n)
            .filter(|k| {
                *k != anchor
                    && is_basis(a1, s1_vecs[*k], tolerance)
                    && is_basis(a2, s2_vecs[*k], tolerance)
            })
            .map(|k| {
                let c1 = a1.cross(s1_vecs[k]).abs() / (ext1 * ext1);
                let c2 = a2.cross(s2_vecs[k]).abs() / (ext2 * ext2);
                (k, c1.min(c2))
            }),
    )?;
    Some((anchor.min(partner), anchor.max(partner)))
}

/// Basis pairs to try, the best conditioned first and then in sequence order.
///
/// When a transform exists any well conditioned pair finds it, so only the first
/// [MAX_BASIS_ATTEMPTS] are worth checking against the whole path.
fn candidate_pairs<'a>(
    s1_vecs: &'a [Vec2],
    s2_vecs: &'a [Vec2],
    tolerance: f64,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let best = best_conditioned_pair(s1_vecs, s2_vecs, tolerance);
    best.into_iter()
        .chain(basis_pairs(s1_vecs, s2_vecs, tolerance).filter(move |pair| Some(*pair) != best))
        .take(MAX_BASIS_ATTEMPTS)
}

/// The linear map taking a1 to b1 and a2 to b2.
///
/// None if a1 and a2 are parallel.
fn solve_linear(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Affine> {
    let det = a1.cross(a2);
    if det == 0.0 {
        return None;
    }
    // M = [b1 b2] * inverse([a1 a2])
    let a = (b1.x * a2.y - b2.x * a1.y) / det;
    let c = (b2.x * a1.x - b1.x * a2.x) / det;
    let b = (b1.y * a2.y - b2.y * a1.y) / det;
    let d = (b2.y * a1.x - b1.y * a2.x) / det;
    Some(Affine::new([a, b, c, d, 0.0, 0.0]))
}

/// The coarsest rounding of `affine` that still works, or `affine` itself if none does.
fn round_working_affine(
    affine: Affine,
    s1_points: &[Vec<Point>],
    s2_points: &[Vec<Point>],
    tolerance: f64,
) -> Affine {
    AFFINE_ROUND_DIGITS
        .map(|ndigits| round_affine(affine, ndigits))
        .find(|rounded| try_affine_between(*rounded, s1_points, s2_points, tolerance))
        .unwrap_or(affine)
}

/// Returns an affine that turns s1 into s2 or None if no solution was found.
///
/// Intended use is to call this only when the normalized versions of the shapes
/// are the same, in which case finding a solution is typical. Fails only if
/// either shape is malformed.
///
/// <https://github.com/googlefonts/picosvg/blob/69cbfec486eca35a46187405abc39f608d3b2963/src/picosvg/svg_reuse.py#L296-L383>
pub fn affine_between(s1: &Shape, s2: &Shape, tolerance: f64) -> Result<Option<Affine>, Error> {
    Ok(affine_between_paths(
        &s1.canonicalize()?,
        &s2.canonicalize()?,
        tolerance,
    ))
}

/// [affine_between] for already canonical paths.
pub fn affine_between_paths(
    s1: &CanonicalPath,
    s2: &CanonicalPath,
    tolerance: f64,
) -> Option<Affine> {
    if !s1.same_topology(s2) {
        debug!("No affine between {s1} and {s2}, they are drawn with different commands");
        return None;
    }

    let s1_vecs = vectors(s1);
    let s2_vecs = vectors(s2);
    let (Some(s1_move), Some(s2_move)) = (s1.first_move(), s2.first_move()) else {
        debug!("No affine between empty paths");
        return None;
    };
    let mut candidates = candidate_pairs(&s1_vecs, &s2_vecs, tolerance).peekable();
    if candidates.peek().is_none() {
        debug!("No affine between {s1} and {s2}, no pair of vectors spans the plane");
        return None;
    }

    // Easy mode?
    if s1.almost_equals(s2, tolerance) {
        return Some(Affine::IDENTITY);
    }

    let s1_points = command_points(s1);
    let s2_points = command_points(s2);

    // Just move to the same start point?
    let affine = Affine::translate(s2_move - s1_move);
    if try_affine_between(affine, &s1_points, &s2_points, tolerance) {
        return Some(round_working_affine(
            affine,
            &s1_points,
            &s2_points,
            tolerance,
        ));
    }

    for (i, j) in candidates {
        let Some(linear) = solve_linear(s1_vecs[i], s1_vecs[j], s2_vecs[i], s2_vecs[j]) else {
            continue;
        };

        // The initial move is a position, not a displacement; it only informs translation
        if let Some(k) = (1..s1_vecs.len()).find(|k| {
            let mapped = (linear * s1_vecs[*k].to_point()).to_vec2();
            !mapped.almost_equals(s2_vecs[*k], tolerance)
        }) {
            trace!("Basis ({i}, {j}) gives {linear:?}, which fails for vector {k}");
            continue;
        }

        let translate = s2_move - linear * s1_move;
        let affine = combine_ltr(&[linear, Affine::translate(translate)]);
        if !try_affine_between(affine, &s1_points, &s2_points, tolerance) {
            trace!("Basis ({i}, {j}) gives {affine:?}, which matches vectors but not points");
            continue;
        }
        return Some(round_working_affine(
            affine,
            &s1_points,
            &s2_points,
            tolerance,
        ));
    }

    debug!("No affine between {s1} and {s2}");
    None
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Point, Vec2};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        geometry::{round_affine, AlmostEqual},
        normalize::{normalize_with, Normalization},
        vectors::vectors,
        CanonicalPath, Shape,
    };

    use super::{
        affine_between, affine_between_paths, best_conditioned_pair, candidate_pairs,
        combine_ltr, solve_linear, MAX_BASIS_ATTEMPTS,
    };

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rect(x: f64, y: f64, width: f64, height: f64) -> Shape {
        Shape::rect(x, y, width, height)
    }

    fn path(d: &str) -> Shape {
        Shape::path(d)
    }

    // <https://github.com/googlefonts/picosvg/blob/69cbfec486eca35a46187405abc39f608d3b2963/tests/svg_reuse_test.py#L108-L269>
    #[rstest]
    #[case::rect_and_itself(rect(0.0, 0.0, 1.0, 1.0), rect(0.0, 0.0, 1.0, 1.0), Affine::IDENTITY, 0.01)]
    #[case::offset_rect(
        rect(0.0, 1.0, 1.0, 1.0),
        rect(1.0, 0.0, 1.0, 1.0),
        Affine::translate((1.0, -1.0)),
        0.01
    )]
    #[case::different_rects(
        rect(20.0, 20.0, 100.0, 20.0),
        rect(40.0, 30.0, 60.0, 20.0),
        Affine::new([0.6, 0.0, 0.0, 1.0, 28.0, 10.0]),
        0.01
    )]
    // circles that may happen to match the ones Noto clock emoji
    #[case::clock_circles(
        Shape::circle(15.89, 64.13, 4.0),
        Shape::circle(64.89, 16.13, 4.0),
        Affine::translate((49.0, -48.0)),
        0.01
    )]
    // path observed in wild to normalize but not compute affine_between
    #[case::real_example(
        path("M18 12H2 c-1.104 0-2 .896-2 2h20c0-1.104-.896-2-2-2z"),
        path("M34 12H18c-1.104 0-2 .896-2 2h20c0-1.104-.896-2-2-2z"),
        Affine::translate((16.0, 0.0)),
        0.01
    )]
    // triangles facing one another, same size
    #[case::mirrored_triangles(
        path("m60,64 -50,-32 0,30 z"),
        path("m68,64 50,-32 0,30 z"),
        Affine::new([-1.0, 0.0, 0.0, 1.0, 128.0, 0.0]),
        0.01
    )]
    #[case::rotated_scaled_triangles(
        path("m50,100 -48,-75 81,0 z"),
        path("m70,64 50,-32 0,54 z"),
        Affine::new([0.0, 0.6667, -0.6667, 0.0, 136.6667, 30.6667]),
        0.01
    )]
    // a square and a rect; different scale for each axis
    #[case::square_and_rect(
        rect(10.0, 10.0, 50.0, 50.0),
        rect(70.0, 20.0, 20.0, 100.0),
        Affine::new([0.4, 0.0, 0.0, 2.0, 66.0, 0.0]),
        0.01
    )]
    // squares with same first edge but flipped on Y
    #[case::mirrored_squares(
        path("M10,10 10,60 60,60 60,10 z"),
        path("M70,120 90,120 90,20 70,20 z"),
        Affine::new([0.0, -2.0, 0.4, 0.0, 66.0, 140.0]),
        0.01
    )]
    // real example from Noto Emoji, eyes that were normalizing everything to have 0,0 coords
    #[case::noto_emoji_eyes(
        path("M44.67,45.94L44.67,45.94 c-4.19,0-8,3.54-8,9.42 s3.81,9.41,8,9.41l0,0 c4.19,0,8-3.54,8-9.41 S48.86,45.94,44.67,45.94z"),
        path("M83,45.94   L83,45.94    c-4.19,0-8,3.54-8,9.42 s3.81,9.41,8,9.41l0,0 c4.19,0,8-3.54,8-9.41 S87.21,45.94,83,45.94z"),
        Affine::translate((38.33, 0.0)),
        0.1
    )]
    // <https://github.com/googlefonts/picosvg/issues/266> circles become arcs
    #[case::circles(
        Shape::circle(0.0, 0.0, 2.0),
        Shape::circle(0.0, 0.0, 4.0),
        Affine::scale(2.0),
        0.1
    )]
    // rectangles that should become one
    #[case::rects2(
        path("M4,4 L8,4 L8,8 L4,8 L4,4 Z"),
        path("M2,2 L8,2 L8,4 L2,4 L2,2 Z"),
        Affine::new([1.5, 0.0, 0.0, 0.5, -4.0, 0.0]),
        0.01
    )]
    // <https://github.com/googlefonts/picosvg/issues/271> arcs whose start/end match in a dimension
    // my arc is marginally taller than your arc
    #[case::arcs_in_same_dimension(
        path("M0,0 a 1 0.5 0 1 1 2 0"),
        path("M0,0 a 1 1 0 1 1 2 0"),
        Affine::scale_non_uniform(1.0, 2.0),
        0.01
    )]
    // normalized the same but didn't find an affine between
    #[case::arcs_in_same_dimension2(
        path("M104.64,10.08 A40.64 6.08 0 1 1 23.36,10.08 A40.64 6.08 0 1 1 104.64,10.08 Z"),
        path("M99.63,23.34 A36.19 4.81 0 1 1 27.25,23.34 A36.19 4.81 0 1 1 99.63,23.34 Z"),
        Affine::new([0.8905, 0.0, 0.0, 0.7911, 6.4479, 15.3655]),
        0.01
    )]
    // didn't even normalize the same
    #[case::arcs_in_same_dimension3(
        path("M119.47,90.07 A55.47 10.49 0 1 1 8.53,90.07 A55.47 10.49 0 1 1 119.47,90.07 Z"),
        path("M94.09,71.71 A12.2 3.92 0 1 1 69.69,71.71 A12.2 3.92 0 1 1 94.09,71.71 Z"),
        Affine::new([0.2199, 0.0, 0.0, 0.3737, 67.8139, 38.0518]),
        0.01
    )]
    fn affine_between_shapes(
        #[case] s1: Shape,
        #[case] s2: Shape,
        #[case] expected: Affine,
        #[case] tolerance: f64,
    ) {
        init_logging();
        assert_eq!(
            Some(expected),
            affine_between(&s1, &s2, tolerance)
                .unwrap()
                .map(|a| round_affine(a, 4)),
            "wrong affine between:\ns1: {s1:?}\ns2: {s2:?}"
        );
    }

    // Real example from Noto Emoji; the shapes only line up to within about half a unit
    // <https://github.com/googlefonts/picosvg/issues/138>
    #[test]
    fn affine_between_noto_emoji_shapes() {
        init_logging();
        let s1 = path("M98.267,28.379 L115.157,21.769 Q116.007,21.437 116.843,21.802 Q117.678,22.168 118.011,23.017 Q118.343,23.867 117.978,24.703 Q117.612,25.538 116.763,25.871 L99.873,32.481 Q99.023,32.813 98.187,32.448 Q97.352,32.082 97.019,31.233 Q96.687,30.383 97.052,29.547 Q97.418,28.712 98.267,28.379 Z")
            .canonicalize()
            .unwrap();
        let s2 = path("M81.097,20.35 L79.627,4.2 Q79.544,3.291 80.128,2.59 Q80.712,1.889 81.62,1.807 Q82.529,1.724 83.23,2.308 Q83.931,2.892 84.013,3.8 L85.483,19.95 Q85.566,20.859 84.982,21.56 Q84.398,22.261 83.49,22.343 Q82.581,22.426 81.88,21.842 Q81.179,21.258 81.097,20.35 Z")
            .canonicalize()
            .unwrap();
        let affine = affine_between_paths(&s1, &s2, 1.0).expect("Should find an affine");
        assert!(s1.transformed(affine).almost_equals(&s2, 1.0));

        // roughly a rotation by -74 degrees and a scale by 0.9
        let expected = [0.249, -0.859, 0.859, 0.249];
        let actual = affine.as_coeffs();
        for (e, a) in expected.iter().zip(&actual[..4]) {
            assert!(e.almost_equals(*a, 0.15), "{actual:?}");
        }
    }

    // a rect and a circle can never be the same!
    #[rstest]
    #[case::rect_and_circle(rect(0.0, 0.0, 1.0, 1.0), Shape::circle(0.0, 0.0, 1.0), 0.01)]
    #[case::rect_and_triangle(rect(0.0, 0.0, 1.0, 1.0), path("M0,0 L1,0 L1,1 Z"), 0.01)]
    #[case::line_and_curve(path("M0,0 L1,0 L1,1 Z"), path("M0,0 Q1,0 1,1 Z"), 0.01)]
    fn different_topology(#[case] s1: Shape, #[case] s2: Shape, #[case] tolerance: f64) {
        init_logging();
        assert_eq!(None, affine_between(&s1, &s2, tolerance).unwrap());
        assert_ne!(
            normalize_with(&s1, tolerance, Normalization::AxisScale).unwrap(),
            normalize_with(&s2, tolerance, Normalization::AxisScale).unwrap()
        );
    }

    // Same lines, but the arc bulges the other way
    #[test]
    fn mirrored_arc() {
        init_logging();
        let s1 = path("M0,0 L4,0 A2 2 0 0 1 0,0 Z");
        let s2 = path("M0,0 L4,0 A2 2 0 0 0 0,0 Z");
        assert_eq!(
            Some(Affine::FLIP_Y),
            affine_between(&s1, &s2, 0.01).unwrap()
        );
    }

    // Same kind of commands but not related by any affine
    #[test]
    fn no_affine_between_quadrilaterals() {
        init_logging();
        let s1 = path("M0,0 L4,0 L4,4 L0,4 Z");
        let s2 = path("M0,0 L4,0 L5,4 L0,3 Z");
        assert_eq!(None, affine_between(&s1, &s2, 0.01).unwrap());
    }

    #[rstest]
    #[case::point(path("M5,5"))]
    #[case::empty(path(""))]
    #[case::line(Shape::line(0.0, 0.0, 10.0, 10.0))]
    #[case::collinear(path("M0,0 L1,1 L3,3 Z"))]
    fn no_affine_without_extent(#[case] shape: Shape) {
        init_logging();
        assert_eq!(None, affine_between(&shape, &shape, 0.01).unwrap());
    }

    #[test]
    fn malformed_shape_is_an_error() {
        assert!(affine_between(&path("M0,0 L1,banana"), &rect(0.0, 0.0, 1.0, 1.0), 0.01).is_err());
        assert!(affine_between(&rect(0.0, 0.0, 1.0, 1.0), &Shape::circle(0.0, 0.0, -1.0), 0.01).is_err());
    }

    fn sample_shapes() -> Vec<Shape> {
        vec![
            rect(20.0, 20.0, 100.0, 20.0),
            Shape::rounded_rect(3.0, 4.0, 10.0, 7.0, Some(2.0), Some(1.0)),
            Shape::ellipse(5.0, 6.0, 4.0, 1.5),
            path("m50,100 -48,-75 81,0 z"),
            path("M18 12H2 c-1.104 0-2 .896-2 2h20c0-1.104-.896-2-2-2z"),
            path("M1,1 A4 2 30 0 1 6,3 L7,9 Q2,8 1,1 Z"),
        ]
    }

    #[test]
    fn affine_between_shape_and_itself_is_identity() {
        init_logging();
        for shape in sample_shapes() {
            assert_eq!(
                Some(Affine::IDENTITY),
                affine_between(&shape, &shape, 0.01).unwrap(),
                "{shape:?}"
            );
        }
    }

    #[rstest]
    #[case::translate(Affine::translate((7.0, -3.0)))]
    #[case::rotate(Affine::rotate(1.0))]
    #[case::scale(Affine::scale_non_uniform(2.0, 0.5))]
    #[case::mirror(Affine::FLIP_X)]
    #[case::skew(Affine::skew(0.5, 0.0))]
    #[case::everything(Affine::translate((-4.0, 9.0)) * Affine::rotate(-0.3) * Affine::scale_non_uniform(1.5, 3.0))]
    fn affine_between_recovers_transform(#[case] affine: Affine) {
        init_logging();
        for shape in sample_shapes() {
            let s1 = shape.canonicalize().unwrap();
            let s2 = s1.transformed(affine);
            let found = affine_between_paths(&s1, &s2, 0.01)
                .unwrap_or_else(|| panic!("No affine from {s1} to {s2}"));
            for (e, a) in affine.as_coeffs().iter().zip(found.as_coeffs()) {
                assert!(e.almost_equals(a, 1e-3), "{affine:?}\n{found:?}\n{s1}");
            }

            // and back again
            let inverse = affine_between_paths(&s2, &s1, 0.01)
                .unwrap_or_else(|| panic!("No affine from {s2} to {s1}"));
            for (e, a) in affine.inverse().as_coeffs().iter().zip(inverse.as_coeffs()) {
                assert!(e.almost_equals(a, 1e-3), "{affine:?}\n{inverse:?}\n{s1}");
            }
        }
    }

    fn canonical(shape: Shape) -> CanonicalPath {
        shape.canonicalize().unwrap()
    }

    // Whether a transform exists must not depend on which way round we ask
    #[test]
    fn existence_is_symmetric() {
        init_logging();
        let shapes: Vec<_> = sample_shapes().into_iter().map(canonical).collect();
        let mut pairs: Vec<_> = shapes
            .iter()
            .flat_map(|s1| shapes.iter().map(move |s2| (s1.clone(), s2.clone())))
            .collect();

        let square = canonical(rect(0.0, 0.0, 4.0, 4.0));
        let triangle = canonical(path("m50,100 -48,-75 81,0 z"));
        pairs.extend([
            // collapsed to a line
            (square.clone(), square.transformed(Affine::scale_non_uniform(1.0, 0.0))),
            // flattened below tolerance
            (square.clone(), square.transformed(Affine::scale_non_uniform(1.0, 0.001))),
            // singular, the image is a line
            (
                triangle.clone(),
                triangle.transformed(Affine::new([1.0, 2.0, 0.5, 1.0, 0.0, 0.0])),
            ),
            (triangle.clone(), triangle.transformed(Affine::skew(0.3, 0.0))),
            (
                canonical(path("M0,0 L4,0 L4,4 L0,4 Z")),
                canonical(path("M0,0 L4,0 L5,4 L0,3 Z")),
            ),
            (square, canonical(path("M0,0 L4,0 L5,4 L0,3 Z"))),
        ]);

        for (s1, s2) in pairs {
            assert_eq!(
                affine_between_paths(&s1, &s2, 0.01).is_some(),
                affine_between_paths(&s2, &s1, 0.01).is_some(),
                "\ns1: {s1}\ns2: {s2}"
            );
        }
    }

    // Alternating radii keep neighbouring edges from being parallel
    fn star(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let radius = if i % 2 == 0 { 100.0 } else { 90.0 };
                let angle = i as f64 * std::f64::consts::TAU / n as f64;
                Point::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    }

    // Every basis pair agrees until the very end; only a few are worth checking
    #[test]
    fn many_vertices_one_out_of_place() {
        init_logging();
        let points = star(3000);
        let mut moved = points.clone();
        moved[2998].x += 5.0;
        let s1 = canonical(Shape::polygon(points));
        let s2 = canonical(Shape::polygon(moved));

        let (v1, v2) = (vectors(&s1), vectors(&s2));
        assert_eq!(MAX_BASIS_ATTEMPTS, candidate_pairs(&v1, &v2, 0.01).count());
        assert_eq!(None, affine_between_paths(&s1, &s2, 0.01));
    }

    #[test]
    fn many_vertices_transformed() {
        init_logging();
        let affine = Affine::translate((3.0, 4.0)) * Affine::rotate(0.7) * Affine::scale(1.5);
        let s1 = canonical(Shape::polygon(star(3000)));
        let s2 = s1.transformed(affine);
        let found = affine_between_paths(&s1, &s2, 0.01).expect("Should find an affine");
        for (e, a) in affine.as_coeffs().iter().zip(found.as_coeffs()) {
            assert!(e.almost_equals(a, 1e-3), "{affine:?}\n{found:?}");
        }
    }

    #[test]
    fn best_pair_is_longest_and_least_parallel() {
        let shape = canonical(path("M0,0 L1,0 L10,1 L0,10 Z"));
        let s1 = vectors(&shape);
        let s2 = vectors(&shape.transformed(Affine::scale(2.0)));
        // (-10, 9) is the longest, (9, 1) is the furthest from parallel to it
        assert_eq!(Some((2, 3)), best_conditioned_pair(&s1, &s2, 0.01));
        assert_eq!(Some((2, 3)), best_conditioned_pair(&s2, &s1, 0.01));
        // then the rest in order
        assert_eq!(
            vec![(2, 3), (1, 2), (1, 3)],
            candidate_pairs(&s1, &s2, 0.01).collect::<Vec<_>>()
        );
    }

    #[test]
    fn combine_ltr_goes_left_to_right() {
        let scale_then_move = combine_ltr(&[Affine::scale(2.0), Affine::translate((1.0, 0.0))]);
        assert_eq!(
            kurbo::Point::new(3.0, 0.0),
            scale_then_move * kurbo::Point::new(1.0, 0.0)
        );
        assert_eq!(Affine::IDENTITY, combine_ltr(&[]));
    }

    #[test]
    fn solve_for_basis() {
        let m = Affine::new([0.0, 0.6, -0.6, 0.0, 0.0, 0.0]);
        let (a1, a2) = (Vec2::new(-48.0, -75.0), Vec2::new(81.0, 0.0));
        let apply = |v: Vec2| (m * v.to_point()).to_vec2();
        let solved = solve_linear(a1, a2, apply(a1), apply(a2)).unwrap();
        assert!(solved.as_coeffs().iter().zip(m.as_coeffs()).all(|(s, e)| s.almost_equals(e, 1e-12)));
        assert_eq!(None, solve_linear(a1, a1 * 2.0, a1, a1));
    }

    // The first arc vector pair is the chord and the sagitta, never parallel for a real arc
    #[test]
    fn arc_has_basis_of_its_own() {
        let vecs = vectors(&path("M0,0 a 1 0.5 0 1 1 2 0").canonicalize().unwrap());
        assert!(vecs[1].cross(vecs[2]).abs() > 0.1);
    }
}
