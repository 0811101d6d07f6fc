//! Error handling for gcodetube
//!
//! Provides the error types for each layer of the pipeline:
//! - G-Code errors (interpreting the command stream)
//! - Mesh errors (building and slicing tube chunks)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::data::Units;

/// G-Code error type
///
/// Raised while interpreting a command stream. Any of these aborts the parse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// A required operand carried a payload that is not a number
    #[error("could not read the value of '{operand}' at line {line_number}: '{line}'")]
    MalformedOperand {
        /// Zero-based index of the offending line.
        line_number: usize,
        /// The operand letter.
        operand: char,
        /// The source line as read.
        line: String,
    },

    /// The stream switched to a unit system other than millimetres
    #[error("{units} values are not supported (line {line_number}: '{line}')")]
    UnsupportedUnitSystem {
        /// Zero-based index of the offending line.
        line_number: usize,
        /// The requested unit system.
        units: Units,
        /// The source line as read.
        line: String,
    },
}

impl GcodeError {
    /// Line the error was raised on
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedOperand { line_number, .. }
            | Self::UnsupportedUnitSystem { line_number, .. } => *line_number,
        }
    }
}

/// Mesh error type
///
/// Raised by tube chunks and the chunk manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A slice bound was negative
    #[error("invalid slice range: start {start:?}, end {end:?}")]
    InvalidSliceRange {
        /// Requested start, if given.
        start: Option<i64>,
        /// Requested end, if given.
        end: Option<i64>,
    },

    /// A point was appended after the chunk was finished
    #[error("chunk is sealed, no further points can be added")]
    ChunkSealed,

    /// Tube rings need at least three sides
    #[error("radial segments must be at least 3, got {0}")]
    InvalidRadialSegments(u32),

    /// A tube configuration value is out of range
    #[error("invalid tube setting '{field}': {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Main error type for gcodetube
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Mesh error
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is a mesh error
    pub fn is_mesh_error(&self) -> bool {
        matches!(self, Error::Mesh(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
