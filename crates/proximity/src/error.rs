//! Error types shared by every proximity operation.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProximityError>;

/// Errors produced while building or querying proximities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProximityError {
    /// A numeric parameter was NaN or infinite where a finite value is required.
    #[error("{what} must be finite, got {value}")]
    NonFinite {
        /// Name of the rejected parameter.
        what: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A size-like parameter was negative.
    #[error("{what} must not be negative, got {value}")]
    Negative {
        /// Name of the rejected parameter.
        what: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A polygon needs at least three points.
    #[error("polygon needs at least 3 points, got {count}")]
    TooFewPoints {
        /// Number of points supplied.
        count: usize,
    },

    /// A polygon point had a non-finite coordinate.
    #[error("polygon point {index} is not finite")]
    NonFinitePoint {
        /// Index of the offending point.
        index: usize,
    },

    /// A principal axis name could not be parsed.
    #[error("invalid principal axis '{0}', expected x, y or z")]
    InvalidAxis(String),

    /// The shape does not provide the requested capability.
    #[error("{capability} is not supported by {shape}")]
    Unsupported {
        /// The capability that was probed.
        capability: &'static str,
        /// Short description of the shape that was probed.
        shape: &'static str,
    },

    /// The region has no boundary to project onto.
    #[error("region has no border to project onto")]
    NoBorder,

    /// Ear clipping failed for the given polygon.
    #[error("triangulation failed: {0}")]
    Triangulation(#[from] TriangulationError),

    /// The tracking proximity was used after it was disposed.
    #[error("tracking proximity used after disposal")]
    Disposed,

    /// A configuration document could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProximityError {
    pub(crate) fn unsupported(capability: &'static str, shape: &'static str) -> Self {
        Self::Unsupported { capability, shape }
    }
}

/// Failure modes of the ear-clipping triangulation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangulationError {
    /// Fewer than three points were supplied.
    #[error("need at least 3 points, got {0}")]
    TooFewPoints(usize),

    /// No ear was found after scanning the remaining ring; the input is
    /// degenerate or self-intersecting.
    #[error("no ear found among {remaining} remaining vertices after {attempts} attempts")]
    NoEar {
        /// Vertices left in the ring when the search gave up.
        remaining: usize,
        /// Number of vertices examined.
        attempts: usize,
    },

    /// The output buffer cannot hold the requested number of triangles.
    #[error("index buffer holds {capacity} indices, {required} required")]
    BufferTooSmall {
        /// Length of the supplied buffer.
        capacity: usize,
        /// Number of indices needed.
        required: usize,
    },
}

/// Checks that `value` is finite.
pub(crate) fn ensure_finite(what: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProximityError::NonFinite { what, value })
    }
}

/// Checks that `value` is finite and not negative.
pub(crate) fn ensure_non_negative(what: &'static str, value: f32) -> Result<f32> {
    let value = ensure_finite(what, value)?;
    if value < 0.0 {
        Err(ProximityError::Negative { what, value })
    } else {
        Ok(value)
    }
}
