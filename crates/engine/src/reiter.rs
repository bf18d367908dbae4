//! Re-iterable factory
//!
//! `fetch` hands out a [`ReIterFn`]; every call builds and initializes a
//! fresh sequential iterator over the same element stream. Passes are
//! independent, so they may be interleaved freely. The factory does not
//! track what it spawned: each [`SpawnedIter`] is owned and closed by the
//! caller.

use std::sync::Arc;

use sideinput_core::{ElementStream, ShapeError, SideInputType};
use tracing::debug;

use crate::builder::{IterBuilder, SpawnedIter};
use crate::error::{Result, SideInputError};
use crate::input::{ReusableInput, SideValue};

/// Factory of independent passes over one stream
pub struct ReIterValue {
    ty: SideInputType,
    inner: SideInputType,
    stream: Arc<dyn ElementStream>,
    builder: IterBuilder,
}

impl ReIterValue {
    /// Create a factory for the re-iterable type `ty`
    ///
    /// Fails with `IllegalShape` unless `ty` is a valid re-iterable shape,
    /// and with `Unsupported` when the inner iterator cannot be built.
    pub(crate) fn new(
        ty: SideInputType,
        stream: Arc<dyn ElementStream>,
        builder: IterBuilder,
    ) -> Result<Self> {
        let sig = match &ty {
            SideInputType::ReIter(sig) => sig.clone(),
            other => {
                return Err(SideInputError::illegal_shape(
                    other,
                    ShapeError::WrongShape {
                        expected: "re-iter",
                        actual: other.to_string(),
                    },
                ))
            }
        };
        if !builder.analyzer.is_reiter(&ty) {
            let cause = builder
                .analyzer
                .unfold_iter(&sig)
                .err()
                .unwrap_or(ShapeError::WrongShape {
                    expected: "re-iter",
                    actual: ty.to_string(),
                });
            return Err(SideInputError::illegal_shape(&ty, cause));
        }
        let inner = SideInputType::Iter(sig);
        builder.check_iter(&inner)?;
        debug!(target: "sideinput::engine", ty = %ty, "Built re-iterable factory");
        Ok(ReIterValue {
            ty,
            inner,
            stream,
            builder,
        })
    }

    /// Declared type
    pub fn side_input_type(&self) -> &SideInputType {
        &self.ty
    }
}

impl ReusableInput for ReIterValue {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn fetch(&mut self) -> Result<SideValue<'_>> {
        Ok(SideValue::ReIter(ReIterFn {
            inner: &self.inner,
            stream: &self.stream,
            builder: &self.builder,
        }))
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for ReIterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReIterValue")
            .field("ty", &self.ty.to_string())
            .finish_non_exhaustive()
    }
}

/// Callable producing a fresh iterator per call
#[derive(Clone, Copy)]
pub struct ReIterFn<'a> {
    inner: &'a SideInputType,
    stream: &'a Arc<dyn ElementStream>,
    builder: &'a IterBuilder,
}

impl ReIterFn<'_> {
    /// Start a new pass from the beginning of the stream
    pub fn call(&self) -> Result<SpawnedIter> {
        self.builder.spawn(self.inner, Arc::clone(self.stream))
    }
}

impl std::fmt::Debug for ReIterFn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReIterFn")
            .field("inner", &self.inner.to_string())
            .finish_non_exhaustive()
    }
}
