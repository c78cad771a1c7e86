use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to use path {d:?}: {reason}")]
    InvalidPath { d: String, reason: String },
    #[error("Invalid {kind}, {attribute} is {value}")]
    InvalidShape {
        kind: &'static str,
        attribute: &'static str,
        value: f64,
    },
    #[error("Invalid {kind}, its coordinates overflow")]
    NonFiniteGeometry { kind: &'static str },
}
