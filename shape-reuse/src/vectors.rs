//! The vector signature of a path.
//!
//! If we thought of the path as a series of vectors to the endpoints of each successive
//! drawing command what would it look like?
//!
//! <https://github.com/googlefonts/picosvg/blob/69cbfec486eca35a46187405abc39f608d3b2963/src/picosvg/svg_reuse.py#L90>

use kurbo::{Point, Vec2};

use crate::{
    arc::sagitta,
    path::{CanonicalPath, PathCommand},
};

/// Walks a path yielding the vector between successive waypoints.
///
/// The first vector runs from the origin to the first move, so it is really
/// a position. Each command contributes one vector except:
///
/// * close always contributes (0, 0)
/// * an arc contributes its chord and then the vector from its apex to the
///   middle of the chord. An arc from (0, 0) to (2, 0) has a chord with no y
///   magnitude at all no matter how far it bulges, so the chord alone makes
///   arcs of different heights look identical.
pub struct VecsIter<'a> {
    commands: &'a [PathCommand],
    idx: usize,
    subpath_start: Point,
    curr_pos: Point,
    // the second vector of an arc, waiting its turn
    pending: Option<Vec2>,
}

impl<'a> VecsIter<'a> {
    pub fn new(path: &'a CanonicalPath) -> Self {
        Self {
            commands: path.commands(),
            idx: 0,
            subpath_start: Point::ZERO,
            curr_pos: Point::ZERO,
            pending: None,
        }
    }
}

impl Iterator for VecsIter<'_> {
    type Item = Vec2;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(vec) = self.pending.take() {
            return Some(vec);
        }
        let command = self.commands.get(self.idx)?;
        self.idx += 1;
        let vec = match command {
            PathCommand::MoveTo(p) => {
                let result = *p - self.curr_pos;
                self.subpath_start = *p;
                self.curr_pos = *p;
                result
            }
            PathCommand::LineTo(p) | PathCommand::QuadTo(_, p) | PathCommand::CurveTo(_, _, p) => {
                let result = *p - self.curr_pos;
                self.curr_pos = *p;
                result
            }
            PathCommand::ArcTo(arc) => {
                let chord = arc.end - self.curr_pos;
                self.pending = Some(sagitta(self.curr_pos, arc));
                self.curr_pos = arc.end;
                chord
            }
            PathCommand::ClosePath => {
                self.curr_pos = self.subpath_start;
                Vec2::ZERO
            }
        };
        Some(vec)
    }
}

/// The vector signature of `path`, see [VecsIter].
pub fn vectors(path: &CanonicalPath) -> Vec<Vec2> {
    VecsIter::new(path).collect()
}

/// The first vector, skipping the initial move, whose `val_fn` is at least `tolerance`.
///
/// <https://github.com/googlefonts/picosvg/blob/69cbfec486eca35a46187405abc39f608d3b2963/src/picosvg/svg_reuse.py#L164>
pub(crate) fn first_significant(
    vecs: VecsIter,
    val_fn: impl Fn(Vec2) -> f64,
    tolerance: f64,
) -> Option<(usize, Vec2)> {
    vecs.enumerate()
        .skip(1) // skip initial move
        .find(|(_, vec)| val_fn(*vec).abs() >= tolerance)
}
