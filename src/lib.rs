//! Side-input materialization for data-parallel pipeline workers
//!
//! A user function may declare side inputs as a fixed value, a single-pass
//! iterator, a re-iterable factory or a keyed multimap. This crate builds
//! the matching reusable input for each declared parameter and drives its
//! `init` / `fetch` / `reset` lifecycle around every invocation.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sideinput::{
//!     EngineConfig, InputRegistry, IterSignature, MemoryStream, SideInputEngine,
//!     SideInputSource, SideInputType, ValueType,
//! };
//!
//! let engine = SideInputEngine::new(Arc::new(InputRegistry::new()), EngineConfig::default());
//! let ty = SideInputType::Iter(IterSignature::values(ValueType::Int));
//! let stream = Arc::new(MemoryStream::from_values([1, 2, 3]));
//!
//! let mut slot = engine.slot(&ty, SideInputSource::Stream(stream))?;
//! let total = slot.invoke(|value| {
//!     let mut sum = 0;
//!     for row in value.into_iter_fn()? {
//!         sum += row?[0].as_value().and_then(|v| v.as_int()).unwrap_or(0);
//!     }
//!     Ok::<_, sideinput::SideInputError>(sum)
//! })?;
//! ```
//!
//! # Architecture
//!
//! - `sideinput-core`: values, records, shapes and collaborator traits
//! - `sideinput-storage`: in-memory streams, keyed state and adapters
//! - `sideinput-engine`: registry, strategies, engine facade and slots

// Re-export the public API from the engine and its collaborators
pub use sideinput_core::{
    ConversionError, Cursor, DeclaredType, DefaultConverter, ElementRecord, ElementStream,
    EventTime, FieldRole, IterSignature, ProcessContext, ShapeAnalyzer, ShapeDescriptor,
    ShapeError, SideInputAdapter, SideInputType, SignatureAnalyzer, StateReader, StreamError,
    StreamResult, TypeConverter, Value, ValueType, Window,
};
pub use sideinput_engine::*;
pub use sideinput_storage::{
    KeyedStateStream, MemoryCursor, MemoryStateStore, MemoryStream, StateBackedAdapter,
};
