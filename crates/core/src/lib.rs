//! Core types and traits for side-input materialization
//!
//! This crate defines the foundational types shared by the engine and the
//! collaborators it consumes:
//! - Value / ValueType: dynamically typed field values and their declared types
//! - EventTime, Window, ElementRecord: the records an element stream delivers
//! - SideInputType / ShapeDescriptor: the closed set of supported parameter shapes
//! - Traits: ElementStream, Cursor, ShapeAnalyzer, TypeConverter,
//!   SideInputAdapter, StateReader
//! - Default collaborators: SignatureAnalyzer, DefaultConverter
//! - Error: collaborator error types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod convert;
pub mod error;
pub mod shape;
pub mod traits;
pub mod types;
pub mod value;

pub use analyzer::SignatureAnalyzer;
pub use convert::DefaultConverter;
pub use error::{ConversionError, ShapeError, StreamError, StreamResult};
pub use shape::{DeclaredType, FieldRole, IterSignature, ShapeDescriptor, SideInputType, ValueType};
pub use traits::{Cursor, ElementStream, ShapeAnalyzer, SideInputAdapter, StateReader, TypeConverter};
pub use types::{ElementRecord, EventTime, ProcessContext, Window};
pub use value::Value;
