//! Library to identify vector shapes that are reuses of one another.
//!
//! Two shapes are a reuse if an affine transform turns one into the other.
//! [normalize] produces a key under which such shapes tend to collide and
//! [affine_between] confirms a candidate pair by finding the transform.
//!
//! Derived from <https://github.com/googlefonts/nanoemoji>'s and
//! <https://github.com/googlefonts/picosvg>'s implementation of shape reuse.
mod arc;
mod error;
mod geometry;

pub mod affine;
pub mod normalize;
pub mod path;
pub mod shape;
pub mod vectors;

pub use affine::{affine_between, affine_between_paths, AFFINE_ROUND_DIGITS};
pub use error::Error;
pub use geometry::{round_affine, round_digits, MAX_ROUND_DIGITS};
pub use normalize::{normalize, normalize_path, normalize_with, Normalization};
pub use path::{CanonicalPath, EllipticalArc, PathCommand};
pub use shape::{canonicalize, Shape};
pub use vectors::vectors;
