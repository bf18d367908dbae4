//! Sequential iterator over one element stream
//!
//! `IterValue::init` opens a cursor; `fetch` hands out an [`IterFn`] that
//! reads one record per call and maps it onto the declared slots:
//!
//! - `EventTime` slots receive the record timestamp
//! - the `Key` slot receives `primary`, converted to its declared type
//! - the `Value` slot receives `secondary`, converted to its declared type
//!
//! End of stream is `Ok(false)`; any other read failure is
//! [`SideInputError::BrokenStream`]. `reset` closes the cursor.
//!
//! Callers that do not need pooling can use [`IterValue::open`], which
//! returns an [`OpenIter`] owning the cursor: reading a closed iterator is
//! then unrepresentable.

use std::sync::Arc;

use sideinput_core::{
    Cursor, ElementRecord, ElementStream, FieldRole, IterSignature, ShapeDescriptor,
    TypeConverter,
};
use tracing::{debug, error, trace, warn};

use crate::error::{Result, SideInputError};
use crate::input::{Field, ReusableInput, SideValue};

enum IterState {
    Uninitialized,
    Open(Box<dyn Cursor>),
    Reset,
}

impl IterState {
    fn name(&self) -> &'static str {
        match self {
            IterState::Uninitialized => "uninitialized",
            IterState::Open(_) => "initialized",
            IterState::Reset => "reset",
        }
    }
}

pub(crate) fn misuse(op: &'static str, state: &'static str) -> SideInputError {
    error!(target: "sideinput::iter", op, state, "Side input lifecycle violated");
    SideInputError::Lifecycle { op, state }
}

/// Generic sequential iterator driven by a [`ShapeDescriptor`]
pub struct IterValue {
    sig: IterSignature,
    shape: ShapeDescriptor,
    stream: Arc<dyn ElementStream>,
    converter: Arc<dyn TypeConverter>,
    state: IterState,
}

impl IterValue {
    /// Create an iterator; no cursor is opened until `init`
    pub fn new(
        sig: IterSignature,
        shape: ShapeDescriptor,
        stream: Arc<dyn ElementStream>,
        converter: Arc<dyn TypeConverter>,
    ) -> Self {
        IterValue {
            sig,
            shape,
            stream,
            converter,
            state: IterState::Uninitialized,
        }
    }

    /// Declared signature
    pub fn signature(&self) -> &IterSignature {
        &self.sig
    }

    /// Role classification of the signature
    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    /// Whether a cursor is currently open
    pub fn is_open(&self) -> bool {
        matches!(self.state, IterState::Open(_))
    }

    /// Open a cursor and move into the typed open state
    ///
    /// Only legal before `init` or after `reset`. A cursor left open by
    /// `init` is closed before the misuse error is returned.
    pub fn open(self) -> Result<OpenIter> {
        if let IterState::Open(mut cursor) = self.state {
            let err = misuse("open", "initialized");
            if let Err(e) = cursor.close() {
                warn!(target: "sideinput::iter", sig = %self.sig, error = %e, "Failed to close cursor on misuse");
            }
            return Err(err);
        }
        let cursor = self.stream.open().map_err(SideInputError::StreamOpen)?;
        debug!(target: "sideinput::iter", sig = %self.sig, "Opened cursor");
        Ok(OpenIter {
            value: self,
            cursor,
        })
    }
}

impl ReusableInput for IterValue {
    fn init(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(misuse("init", self.state.name()));
        }
        let cursor = self.stream.open().map_err(SideInputError::StreamOpen)?;
        debug!(target: "sideinput::iter", sig = %self.sig, "Opened cursor");
        self.state = IterState::Open(cursor);
        Ok(())
    }

    fn fetch(&mut self) -> Result<SideValue<'_>> {
        match &mut self.state {
            IterState::Open(cursor) => Ok(SideValue::Iter(IterFn {
                cursor,
                shape: &self.shape,
                converter: self.converter.as_ref(),
            })),
            other => Err(misuse("fetch", other.name())),
        }
    }

    fn reset(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, IterState::Reset) {
            IterState::Open(mut cursor) => {
                debug!(target: "sideinput::iter", sig = %self.sig, "Closing cursor");
                cursor.close().map_err(SideInputError::Close)
            }
            other => {
                let state = other.name();
                self.state = other;
                Err(misuse("reset", state))
            }
        }
    }
}

impl std::fmt::Debug for IterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IterValue")
            .field("sig", &self.sig.to_string())
            .field("state", &self.state.name())
            .finish()
    }
}

/// Iterator whose cursor is known to be open
pub struct OpenIter {
    value: IterValue,
    cursor: Box<dyn Cursor>,
}

impl OpenIter {
    /// Callable reading from the open cursor
    pub fn iter_fn(&mut self) -> IterFn<'_> {
        IterFn {
            cursor: &mut self.cursor,
            shape: &self.value.shape,
            converter: self.value.converter.as_ref(),
        }
    }

    /// Close the cursor, returning the iterator for another pass
    ///
    /// On close failure the iterator is dropped with the error.
    pub fn close(mut self) -> Result<IterValue> {
        debug!(target: "sideinput::iter", sig = %self.value.sig, "Closing cursor");
        self.cursor.close().map_err(SideInputError::Close)?;
        Ok(self.value)
    }
}

impl std::fmt::Debug for OpenIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenIter")
            .field("sig", &self.value.sig.to_string())
            .finish_non_exhaustive()
    }
}

/// Pull-based callable over one open cursor
///
/// Each call consumes exactly one record.
pub struct IterFn<'a> {
    cursor: &'a mut Box<dyn Cursor>,
    shape: &'a ShapeDescriptor,
    converter: &'a dyn TypeConverter,
}

impl IterFn<'_> {
    /// Number of output slots each call fills
    pub fn arity(&self) -> usize {
        self.shape.arity()
    }

    /// Read the next record into `out`
    ///
    /// Returns `Ok(false)` at end of stream and leaves `out` untouched. On
    /// error `out` is untouched as well.
    pub fn call(&mut self, out: &mut [Field]) -> Result<bool> {
        if out.len() != self.shape.arity() {
            return Err(SideInputError::ArityMismatch {
                expected: self.shape.arity(),
                actual: out.len(),
            });
        }
        let record = match self.cursor.read() {
            Ok(Some(record)) => record,
            Ok(None) => {
                trace!(target: "sideinput::iter", "End of stream");
                return Ok(false);
            }
            Err(e) => return Err(SideInputError::BrokenStream(e)),
        };
        let fields = map_fields(self.shape, self.converter, record)?;
        for (slot, field) in out.iter_mut().zip(fields) {
            *slot = field;
        }
        Ok(true)
    }

    /// Read the next record into freshly allocated slots
    pub fn next_fields(&mut self) -> Result<Option<Vec<Field>>> {
        let mut out = vec![Field::default(); self.shape.arity()];
        Ok(self.call(&mut out)?.then_some(out))
    }
}

impl Iterator for IterFn<'_> {
    type Item = Result<Vec<Field>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_fields().transpose()
    }
}

impl std::fmt::Debug for IterFn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IterFn")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Map one record onto the declared slots
fn map_fields(
    shape: &ShapeDescriptor,
    converter: &dyn TypeConverter,
    record: ElementRecord,
) -> Result<Vec<Field>> {
    let ElementRecord {
        primary,
        mut secondary,
        timestamp,
    } = record;
    let mut primary = Some(primary);
    let mut fields = Vec::with_capacity(shape.arity());
    for role in shape.roles() {
        let field = match role {
            FieldRole::EventTime => Field::Time(timestamp),
            FieldRole::Key(ty) => {
                let v = primary
                    .take()
                    .or_else(|| secondary.take())
                    .ok_or(SideInputError::MissingSecondary)?;
                Field::Value(converter.convert(v, ty)?)
            }
            FieldRole::Value(ty) => {
                let v = secondary.take().ok_or(SideInputError::MissingSecondary)?;
                Field::Value(converter.convert(v, ty)?)
            }
        };
        fields.push(field);
    }
    trace!(target: "sideinput::iter", slots = fields.len(), ts = timestamp.as_millis(), "Mapped record");
    Ok(fields)
}
