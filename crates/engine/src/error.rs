//! Error types for side-input materialization
//!
//! # Categories
//!
//! | Kind | Variants | Raised |
//! |------|----------|--------|
//! | Configuration | `IllegalShape`, `Unsupported`, `Conversion`, `MissingSecondary`, `ArityMismatch`, `Config` | construction time where detectable |
//! | LifecycleMisuse | `Lifecycle` | `fetch`/`reset` out of order |
//! | Stream | `StreamOpen`, `BrokenStream` | `init`, element reads |
//! | Close | `Close` | `reset` |
//!
//! Configuration and lifecycle errors are fatal: they mean the pipeline or
//! the surrounding framework is wrong, not the data. Nothing in this crate
//! retries.

use sideinput_core::{ConversionError, ShapeError, StreamError};
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SideInputError>;

/// Coarse classification of a [`SideInputError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Pipeline declared a shape or type the engine cannot serve
    Configuration,
    /// The framework drove a side input out of order
    LifecycleMisuse,
    /// Opening or reading the element stream failed
    Stream,
    /// Releasing a cursor failed
    Close,
}

/// Side-input materialization errors
#[derive(Debug, Error)]
pub enum SideInputError {
    /// Declared type does not have the required shape
    #[error("illegal shape for {ty}: {source}")]
    IllegalShape {
        /// Display form of the declared type
        ty: String,
        /// Analyzer's reason
        #[source]
        source: ShapeError,
    },

    /// No registered constructor and generic fallback disabled
    #[error("no input constructor registered for {ty} and generic fallback is disabled")]
    Unsupported {
        /// Display form of the declared type
        ty: String,
    },

    /// A value could not be converted to its declared type
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    /// Shape declares a value slot but the record carries no secondary value
    #[error("record has no secondary value for the declared value slot")]
    MissingSecondary,

    /// Caller passed the wrong number of output slots
    #[error("expected {expected} output slots, got {actual}")]
    ArityMismatch {
        /// Slots the shape declares
        expected: usize,
        /// Slots provided
        actual: usize,
    },

    /// Invalid engine configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// `init`/`fetch`/`reset` called in the wrong state
    #[error("{op} called on {state} side input")]
    Lifecycle {
        /// Operation attempted
        op: &'static str,
        /// State the side input was in
        state: &'static str,
    },

    /// Element stream could not be opened
    #[error("failed to open element stream: {0}")]
    StreamOpen(#[source] StreamError),

    /// Reading the next record failed for a reason other than end of stream
    #[error("broken stream: {0}")]
    BrokenStream(#[source] StreamError),

    /// Cursor failed to close
    #[error("failed to close cursor: {0}")]
    Close(#[source] StreamError),
}

impl SideInputError {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SideInputError::IllegalShape { .. }
            | SideInputError::Unsupported { .. }
            | SideInputError::Conversion(_)
            | SideInputError::MissingSecondary
            | SideInputError::ArityMismatch { .. }
            | SideInputError::Config(_) => ErrorKind::Configuration,
            SideInputError::Lifecycle { .. } => ErrorKind::LifecycleMisuse,
            SideInputError::StreamOpen(_) | SideInputError::BrokenStream(_) => ErrorKind::Stream,
            SideInputError::Close(_) => ErrorKind::Close,
        }
    }

    /// Whether the error indicates a bug in the pipeline or framework
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration | ErrorKind::LifecycleMisuse)
    }

    pub(crate) fn illegal_shape(ty: impl ToString, source: ShapeError) -> Self {
        SideInputError::IllegalShape {
            ty: ty.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sideinput_core::ValueType;
    use std::error::Error as _;

    #[test]
    fn test_kinds() {
        let misuse = SideInputError::Lifecycle {
            op: "fetch",
            state: "uninitialized",
        };
        assert_eq!(misuse.kind(), ErrorKind::LifecycleMisuse);
        assert!(misuse.is_fatal());
        assert_eq!(misuse.to_string(), "fetch called on uninitialized side input");

        let broken = SideInputError::BrokenStream(StreamError::Cancelled);
        assert_eq!(broken.kind(), ErrorKind::Stream);
        assert!(!broken.is_fatal());

        let close = SideInputError::Close(StreamError::Closed);
        assert_eq!(close.kind(), ErrorKind::Close);
        assert!(!close.is_fatal());
    }

    #[test]
    fn test_broken_stream_keeps_source() {
        let err = SideInputError::BrokenStream(StreamError::Corrupt("bad frame".into()));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Corrupt record: bad frame"));
    }

    #[test]
    fn test_conversion_from() {
        let err: SideInputError = ConversionError {
            from: "String",
            to: ValueType::Int,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
