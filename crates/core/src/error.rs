//! Error types for side-input collaborators
//!
//! The engine consumes external collaborators (element streams, the shape
//! analyzer, the type converter). Each reports failures through one of the
//! types defined here. We use `thiserror` for `Display` and `Error`.

use std::io;
use thiserror::Error;

use crate::shape::ValueType;

/// Result type alias for element stream operations
pub type StreamResult<T> = std::result::Result<T, StreamError>;

/// Errors raised by element streams, cursors, adapters and state readers
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error from the underlying transport
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing store or transport could not serve the request
    #[error("Stream unavailable: {0}")]
    Unavailable(String),

    /// The surrounding execution context was cancelled mid-read
    #[error("Stream cancelled")]
    Cancelled,

    /// A record could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Operation on a cursor that has already been closed
    #[error("Cursor already closed")]
    Closed,
}

/// Errors raised by the shape analyzer for unsupported parameter shapes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The type is not of the shape requested
    #[error("illegal {expected} type: {actual}")]
    WrongShape {
        /// Shape the caller asked for ("iter", "re-iter", "multimap")
        expected: &'static str,
        /// Display form of the offending type
        actual: String,
    },

    /// Iterator signature declares no key slot
    #[error("iterator signature declares no key slot")]
    NoKeySlot,

    /// Iterator signature declares more than one value slot
    #[error("iterator signature declares {0} value slots, at most one is allowed")]
    TooManyValueSlots(usize),
}

/// Errors raised by the type converter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {from} to {to}")]
pub struct ConversionError {
    /// Type name of the value presented for conversion
    pub from: &'static str,
    /// Declared target type
    pub to: ValueType,
}
