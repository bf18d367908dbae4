//! Side-input engine facade
//!
//! The worker builds one [`SideInputEngine`] at startup and asks it for a
//! reusable input per side-input parameter. All shape and configuration
//! errors are raised here, before any element is processed.

use std::sync::Arc;

use sideinput_core::{
    DefaultConverter, ElementStream, IterSignature, ShapeAnalyzer, ShapeError, SideInputType,
    SignatureAnalyzer, TypeConverter, Value,
};
use tracing::debug;

use crate::builder::IterBuilder;
use crate::config::EngineConfig;
use crate::error::{Result, SideInputError};
use crate::fixed::FixedValue;
use crate::input::ReusableInput;
use crate::iter::OpenIter;
use crate::multimap::{KeyedSource, MultiMapValue};
use crate::registry::InputRegistry;
use crate::reiter::ReIterValue;
use crate::slot::SideInputSlot;

/// Where a side input's data comes from
pub enum SideInputSource {
    /// Already materialized value, for singleton inputs
    Value(Value),
    /// Restartable element stream, for iterable and re-iterable inputs
    Stream(Arc<dyn ElementStream>),
    /// Keyed state, for multimap inputs
    Keyed(KeyedSource),
}

impl SideInputSource {
    fn name(&self) -> &'static str {
        match self {
            SideInputSource::Value(_) => "value",
            SideInputSource::Stream(_) => "stream",
            SideInputSource::Keyed(_) => "keyed",
        }
    }
}

impl std::fmt::Debug for SideInputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SideInputSource::Value(v) => f.debug_tuple("Value").field(v).finish(),
            SideInputSource::Stream(_) => f.write_str("Stream"),
            SideInputSource::Keyed(k) => f.debug_tuple("Keyed").field(k).finish(),
        }
    }
}

/// Entry point for building side inputs
#[derive(Debug, Clone)]
pub struct SideInputEngine {
    builder: IterBuilder,
}

impl SideInputEngine {
    /// Create an engine with the structural analyzer and default converter
    pub fn new(registry: Arc<InputRegistry>, config: EngineConfig) -> Self {
        Self::with_collaborators(
            registry,
            Arc::new(SignatureAnalyzer),
            Arc::new(DefaultConverter),
            config,
        )
    }

    /// Create an engine with custom shape analysis and conversion
    pub fn with_collaborators(
        registry: Arc<InputRegistry>,
        analyzer: Arc<dyn ShapeAnalyzer>,
        converter: Arc<dyn TypeConverter>,
        config: EngineConfig,
    ) -> Self {
        debug!(
            target: "sideinput::engine",
            registered = registry.len(),
            generic_fallback = config.generic_fallback,
            "Created side-input engine"
        );
        SideInputEngine {
            builder: IterBuilder {
                registry,
                analyzer,
                converter,
                config,
            },
        }
    }

    /// Constructor registry consulted before generic construction
    pub fn registry(&self) -> &Arc<InputRegistry> {
        &self.builder.registry
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.builder.config
    }

    /// Wrap a precomputed value, converted to the singleton's declared type
    pub fn make_fixed(&self, ty: &SideInputType, value: Value) -> Result<FixedValue> {
        match ty {
            SideInputType::Singleton(vt) => {
                let value = self.builder.converter.convert(value, vt)?;
                Ok(FixedValue::new(value))
            }
            other => Err(wrong_shape(other, "singleton")),
        }
    }

    /// Build a sequential iterator for an iterable type
    pub fn make_iter(
        &self,
        ty: &SideInputType,
        stream: Arc<dyn ElementStream>,
    ) -> Result<Box<dyn ReusableInput>> {
        let input = self.builder.make_iter(ty, stream)?;
        debug!(target: "sideinput::engine", ty = %ty, "Built iterator");
        Ok(input)
    }

    /// Open a generic iterator directly, bypassing the registry
    pub fn open_iter(&self, sig: &IterSignature, stream: Arc<dyn ElementStream>) -> Result<OpenIter> {
        self.builder.generic_iter(sig, stream)?.open()
    }

    /// Build a re-iterable factory
    ///
    /// A constructor registered for the exact re-iterable type takes
    /// precedence over the generic factory.
    pub fn make_reiter(
        &self,
        ty: &SideInputType,
        stream: Arc<dyn ElementStream>,
    ) -> Result<Box<dyn ReusableInput>> {
        if let Some(constructor) = self.builder.registry.lookup(ty) {
            debug!(target: "sideinput::engine", ty = %ty, "Using registered re-iterable constructor");
            return Ok(constructor(stream));
        }
        Ok(Box::new(ReIterValue::new(
            ty.clone(),
            stream,
            self.builder.clone(),
        )?))
    }

    /// Build a keyed multimap accessor
    pub fn make_multimap(&self, ty: &SideInputType, source: KeyedSource) -> Result<MultiMapValue> {
        MultiMapValue::new(ty.clone(), source, self.builder.clone())
    }

    /// Build the side input for `ty` from a matching source
    pub fn materialize(
        &self,
        ty: &SideInputType,
        source: SideInputSource,
    ) -> Result<Box<dyn ReusableInput>> {
        match (ty, source) {
            (SideInputType::Singleton(_), SideInputSource::Value(v)) => {
                Ok(Box::new(self.make_fixed(ty, v)?))
            }
            (SideInputType::Iter(_), SideInputSource::Stream(s)) => self.make_iter(ty, s),
            (SideInputType::ReIter(_), SideInputSource::Stream(s)) => self.make_reiter(ty, s),
            (SideInputType::MultiMap { .. }, SideInputSource::Keyed(k)) => {
                Ok(Box::new(self.make_multimap(ty, k)?))
            }
            (ty, source) => Err(SideInputError::illegal_shape(
                ty,
                ShapeError::WrongShape {
                    expected: ty.shape_name(),
                    actual: format!("{} source", source.name()),
                },
            )),
        }
    }

    /// Build a pooled slot for `ty`
    pub fn slot(&self, ty: &SideInputType, source: SideInputSource) -> Result<SideInputSlot> {
        let input = self.materialize(ty, source)?;
        Ok(SideInputSlot::new(ty.clone(), input))
    }
}

fn wrong_shape(ty: &SideInputType, expected: &'static str) -> SideInputError {
    SideInputError::illegal_shape(
        ty,
        ShapeError::WrongShape {
            expected,
            actual: ty.to_string(),
        },
    )
}
