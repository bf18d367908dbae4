//! Iterator construction shared by the engine and nested factories
//!
//! Re-iterable factories and multimap accessors build a fresh iterator on
//! every call. They hold a clone of [`IterBuilder`] so those nested
//! iterators follow the same rules as top-level ones: registered
//! constructor first, then the generic [`IterValue`] if fallback is
//! enabled.

use std::sync::Arc;

use sideinput_core::{
    ElementStream, IterSignature, ShapeAnalyzer, ShapeError, SideInputType, TypeConverter,
};
use tracing::{trace, warn};

use crate::config::EngineConfig;
use crate::error::{Result, SideInputError};
use crate::input::{Field, ReusableInput};
use crate::iter::IterValue;
use crate::registry::InputRegistry;

/// Builds iterators for declared iterator types
#[derive(Clone)]
pub struct IterBuilder {
    pub(crate) registry: Arc<InputRegistry>,
    pub(crate) analyzer: Arc<dyn ShapeAnalyzer>,
    pub(crate) converter: Arc<dyn TypeConverter>,
    pub(crate) config: EngineConfig,
}

impl IterBuilder {
    /// Check that an iterator of type `ty` can be built
    ///
    /// Run at construction time so that failures never surface while
    /// elements are processed.
    pub(crate) fn check_iter(&self, ty: &SideInputType) -> Result<()> {
        if self.registry.is_registered(ty) {
            return Ok(());
        }
        let sig = self.iter_signature(ty)?;
        if !self.config.generic_fallback {
            return Err(SideInputError::Unsupported { ty: ty.to_string() });
        }
        self.analyzer
            .unfold_iter(sig)
            .map(|_| ())
            .map_err(|e| SideInputError::illegal_shape(ty, e))
    }

    /// Build an uninitialized iterator of type `ty` over `stream`
    pub(crate) fn make_iter(
        &self,
        ty: &SideInputType,
        stream: Arc<dyn ElementStream>,
    ) -> Result<Box<dyn ReusableInput>> {
        if let Some(constructor) = self.registry.lookup(ty) {
            trace!(target: "sideinput::engine", ty = %ty, "Using registered constructor");
            return Ok(constructor(stream));
        }
        let sig = self.iter_signature(ty)?;
        if !self.config.generic_fallback {
            return Err(SideInputError::Unsupported { ty: ty.to_string() });
        }
        Ok(Box::new(self.generic_iter(sig, stream)?))
    }

    /// Build the generic iterator for `sig`
    pub(crate) fn generic_iter(
        &self,
        sig: &IterSignature,
        stream: Arc<dyn ElementStream>,
    ) -> Result<IterValue> {
        let shape = self
            .analyzer
            .unfold_iter(sig)
            .map_err(|e| SideInputError::illegal_shape(sig, e))?;
        Ok(IterValue::new(
            sig.clone(),
            shape,
            stream,
            Arc::clone(&self.converter),
        ))
    }

    /// Build and initialize a nested iterator
    pub(crate) fn spawn(
        &self,
        ty: &SideInputType,
        stream: Arc<dyn ElementStream>,
    ) -> Result<SpawnedIter> {
        let mut input = self.make_iter(ty, stream)?;
        input.init()?;
        trace!(target: "sideinput::engine", ty = %ty, "Spawned iterator");
        Ok(SpawnedIter {
            input,
            open: true,
            close_on_drop: self.config.close_spawned_on_drop,
        })
    }

    fn iter_signature<'t>(&self, ty: &'t SideInputType) -> Result<&'t IterSignature> {
        match ty {
            SideInputType::Iter(sig) => Ok(sig),
            other => Err(SideInputError::illegal_shape(
                other,
                ShapeError::WrongShape {
                    expected: "iter",
                    actual: other.to_string(),
                },
            )),
        }
    }
}

impl std::fmt::Debug for IterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IterBuilder")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Initialized iterator handed out by a factory or multimap accessor
///
/// The caller drives it and eventually calls [`close`](SpawnedIter::close).
/// Dropping it while open closes the cursor when the engine is configured
/// with `close_spawned_on_drop`; close failures are then only logged.
pub struct SpawnedIter {
    input: Box<dyn ReusableInput>,
    open: bool,
    close_on_drop: bool,
}

impl SpawnedIter {
    /// Read the next record into `out`; `Ok(false)` at end of stream
    pub fn call(&mut self, out: &mut [Field]) -> Result<bool> {
        self.input.fetch()?.into_iter_fn()?.call(out)
    }

    /// Read the next record into freshly allocated slots
    pub fn next_fields(&mut self) -> Result<Option<Vec<Field>>> {
        self.input.fetch()?.into_iter_fn()?.next_fields()
    }

    /// Drain the remaining records, then close
    pub fn drain(mut self) -> Result<Vec<Vec<Field>>> {
        let mut rows = Vec::new();
        while let Some(fields) = self.next_fields()? {
            rows.push(fields);
        }
        self.close()?;
        Ok(rows)
    }

    /// Close the underlying cursor
    pub fn close(mut self) -> Result<()> {
        self.open = false;
        self.input.reset()
    }
}

impl Iterator for SpawnedIter {
    type Item = Result<Vec<Field>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_fields().transpose()
    }
}

impl Drop for SpawnedIter {
    fn drop(&mut self) {
        if self.open && self.close_on_drop {
            if let Err(e) = self.input.reset() {
                warn!(target: "sideinput::engine", error = %e, "Failed to close dropped iterator");
            }
        }
    }
}

impl std::fmt::Debug for SpawnedIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnedIter")
            .field("open", &self.open)
            .field("close_on_drop", &self.close_on_drop)
            .finish_non_exhaustive()
    }
}
