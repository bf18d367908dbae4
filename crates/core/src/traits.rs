//! Collaborator traits consumed by the engine
//!
//! The engine materializes side inputs on top of these interfaces and never
//! reimplements them. Reference in-memory implementations live in the
//! storage crate; the shape analyzer and type converter have defaults in
//! this crate.

use std::sync::Arc;

use crate::error::{ConversionError, ShapeError, StreamResult};
use crate::shape::{IterSignature, ShapeDescriptor, SideInputType, ValueType};
use crate::types::{ElementRecord, ProcessContext, Window};
use crate::value::Value;

/// Restartable source of element records
///
/// Every call to [`open`](ElementStream::open) yields an independent cursor
/// positioned at the first record. Streams are shared (`Arc`) between a
/// re-iterable factory and the iterators it spawns.
pub trait ElementStream: Send + Sync {
    /// Open a fresh cursor
    fn open(&self) -> StreamResult<Box<dyn Cursor>>;
}

/// Stateful read position into one opening of an element stream
pub trait Cursor: Send {
    /// Read the next record
    ///
    /// Returns `Ok(None)` at end of stream. Any `Err` is a broken stream.
    fn read(&mut self) -> StreamResult<Option<ElementRecord>>;

    /// Release the cursor's resources
    fn close(&mut self) -> StreamResult<()>;
}

/// Classifies declared parameter types
///
/// A classification failure is a configuration error raised when the
/// side input is constructed, never while elements are processed.
pub trait ShapeAnalyzer: Send + Sync {
    /// Whether `t` is a single-pass iterator shape
    fn is_iter(&self, t: &SideInputType) -> bool;

    /// Whether `t` is a re-iterable factory shape
    fn is_reiter(&self, t: &SideInputType) -> bool;

    /// Whether `t` is a keyed multimap shape
    fn is_multimap(&self, t: &SideInputType) -> bool;

    /// Role classification of an iterator signature
    fn unfold_iter(&self, sig: &IterSignature) -> Result<ShapeDescriptor, ShapeError>;

    /// Key type and returned iterator signature of a multimap shape
    fn unfold_multimap(&self, t: &SideInputType) -> Result<(ValueType, IterSignature), ShapeError>;
}

/// Converts generically typed values into declared types
///
/// Assumed total for every type pair the engine presents; an error means
/// the pipeline was configured with incompatible types.
pub trait TypeConverter: Send + Sync {
    /// Convert `value` to `target`
    fn convert(&self, value: Value, target: &ValueType) -> Result<Value, ConversionError>;
}

/// Opaque handle onto stored side-input state
///
/// The engine never calls this directly; it is handed through to the
/// [`SideInputAdapter`].
pub trait StateReader: Send + Sync {
    /// Open a cursor over the values stored for `(side_input_id, window, key)`
    ///
    /// An absent key yields an empty cursor, not an error.
    fn open_multimap(
        &self,
        ctx: &ProcessContext,
        side_input_id: &str,
        window: &Window,
        key: &Value,
    ) -> StreamResult<Box<dyn Cursor>>;
}

/// Produces window-and-key scoped element streams from keyed state
pub trait SideInputAdapter: Send + Sync {
    /// Build the stream of values associated with `key` in `window`
    fn new_keyed_iterable(
        &self,
        ctx: &ProcessContext,
        reader: Arc<dyn StateReader>,
        window: &Window,
        key: Value,
    ) -> StreamResult<Arc<dyn ElementStream>>;
}
