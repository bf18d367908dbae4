//! Keyed multimap accessor
//!
//! `fetch` hands out a [`MultiMapFn`]. Calling it with a key converts the
//! key to the declared key type, asks the adapter for the element stream
//! scoped to `(window, key)` and returns a freshly initialized iterator
//! over it. A key with no stored values yields an empty iterator. Nothing
//! is cached between calls.

use std::sync::Arc;

use sideinput_core::{
    IterSignature, ProcessContext, SideInputAdapter, SideInputType, StateReader, Value, ValueType,
    Window,
};
use tracing::{debug, trace};

use crate::builder::{IterBuilder, SpawnedIter};
use crate::error::{Result, SideInputError};
use crate::input::{ReusableInput, SideValue};

/// Execution environment a multimap side input reads from
#[derive(Clone)]
pub struct KeyedSource {
    /// Execution context passed through to the adapter
    pub ctx: ProcessContext,
    /// Builds per-key element streams
    pub adapter: Arc<dyn SideInputAdapter>,
    /// State handed to the adapter
    pub reader: Arc<dyn StateReader>,
    /// Window the side input is read in
    pub window: Window,
}

impl std::fmt::Debug for KeyedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedSource")
            .field("ctx", &self.ctx)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

/// Keyed lookup side input
pub struct MultiMapValue {
    ty: SideInputType,
    key_type: ValueType,
    inner: SideInputType,
    source: KeyedSource,
    builder: IterBuilder,
}

impl MultiMapValue {
    /// Create an accessor for the multimap type `ty`
    pub(crate) fn new(ty: SideInputType, source: KeyedSource, builder: IterBuilder) -> Result<Self> {
        let (key_type, sig): (ValueType, IterSignature) = builder
            .analyzer
            .unfold_multimap(&ty)
            .map_err(|e| SideInputError::illegal_shape(&ty, e))?;
        let inner = SideInputType::Iter(sig);
        builder.check_iter(&inner)?;
        debug!(
            target: "sideinput::multimap",
            ty = %ty,
            window = %source.window,
            "Built multimap accessor"
        );
        Ok(MultiMapValue {
            ty,
            key_type,
            inner,
            source,
            builder,
        })
    }

    /// Declared type
    pub fn side_input_type(&self) -> &SideInputType {
        &self.ty
    }

    /// Declared key type
    pub fn key_type(&self) -> ValueType {
        self.key_type
    }
}

impl ReusableInput for MultiMapValue {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn fetch(&mut self) -> Result<SideValue<'_>> {
        Ok(SideValue::MultiMap(MultiMapFn { value: self }))
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for MultiMapValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiMapValue")
            .field("ty", &self.ty.to_string())
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Callable returning the values stored under one key
#[derive(Clone, Copy)]
pub struct MultiMapFn<'a> {
    value: &'a MultiMapValue,
}

impl MultiMapFn<'_> {
    /// Declared key type
    pub fn key_type(&self) -> ValueType {
        self.value.key_type
    }

    /// Iterate the values stored under `key` in the current window
    pub fn call(&self, key: impl Into<Value>) -> Result<SpawnedIter> {
        let value = self.value;
        let key = value
            .builder
            .converter
            .convert(key.into(), &value.key_type)?;
        trace!(target: "sideinput::multimap", key_type = %value.key_type, "Looking up key");
        let source = &value.source;
        let stream = source
            .adapter
            .new_keyed_iterable(&source.ctx, Arc::clone(&source.reader), &source.window, key)
            .map_err(SideInputError::StreamOpen)?;
        value.builder.spawn(&value.inner, stream)
    }
}

impl std::fmt::Debug for MultiMapFn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiMapFn")
            .field("ty", &self.value.ty.to_string())
            .finish()
    }
}
