//! Error types for roistat-core
//!
//! Provides a unified error type for frame construction, region handling
//! and statistics reduction. Each variant captures enough context for
//! diagnostics without exposing internal implementation details.

use thiserror::Error;

/// roistat-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A frame must have between 1 and 3 axes, each of non-zero size
    #[error("invalid frame dimensions: {0:?}")]
    InvalidDimension(Vec<usize>),

    /// Buffer length does not match the product of the axis sizes
    #[error("buffer length mismatch: dimensions require {expected} elements, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    /// Raw byte buffer is not a whole number of elements
    #[error("byte buffer of {len} bytes is not a multiple of the {element_size}-byte element")]
    MisalignedBuffer { len: usize, element_size: usize },

    /// Element type code outside the supported set
    #[error("unsupported element type code: {0}")]
    UnsupportedElementType(i32),

    /// Color mode code outside the known set
    #[error("unknown color mode code: {0}")]
    UnknownColorMode(i32),

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for roistat-core operations
pub type Result<T> = std::result::Result<T, Error>;
