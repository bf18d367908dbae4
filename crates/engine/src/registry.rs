//! Input registry for specialized side-input constructors
//!
//! The registry lets a worker install a faster, type-specific constructor
//! for a declared parameter type. The engine consults it before falling
//! back to the generic shape-driven implementation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = Arc::new(InputRegistry::new());
//!
//! // Register a constructor for func(*int) bool
//! registry.register(SideInputType::Iter(IterSignature::values(ValueType::Int)), |stream| {
//!     Box::new(IntIter::new(stream))
//! });
//!
//! assert!(registry.is_registered(&ty));
//! ```
//!
//! One mutex guards registration and lookup. Both are rare and short:
//! registration happens at worker startup, lookups when a side input is
//! constructed. Constructors are cloned out before they run, so user code
//! never executes under the lock.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use sideinput_core::{ElementStream, SideInputType};
use tracing::debug;

use crate::input::ReusableInput;

/// Builds a reusable input over an element stream
pub type InputConstructor =
    Arc<dyn Fn(Arc<dyn ElementStream>) -> Box<dyn ReusableInput> + Send + Sync>;

/// Registry of specialized input constructors keyed by declared type
///
/// Last registration for a type wins.
#[derive(Default)]
pub struct InputRegistry {
    constructors: Mutex<FxHashMap<SideInputType, InputConstructor>>,
}

impl InputRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the constructor for `ty`
    pub fn register<F>(&self, ty: SideInputType, constructor: F)
    where
        F: Fn(Arc<dyn ElementStream>) -> Box<dyn ReusableInput> + Send + Sync + 'static,
    {
        let ty_name = ty.to_string();
        let replaced = self
            .constructors
            .lock()
            .insert(ty, Arc::new(constructor))
            .is_some();
        debug!(target: "sideinput::registry", ty = %ty_name, replaced, "Registered input constructor");
    }

    /// Check if a constructor is registered for `ty`
    pub fn is_registered(&self, ty: &SideInputType) -> bool {
        self.constructors.lock().contains_key(ty)
    }

    /// Get the constructor for `ty`
    pub fn lookup(&self, ty: &SideInputType) -> Option<InputConstructor> {
        self.constructors.lock().get(ty).cloned()
    }

    /// Remove the constructor for `ty`
    pub fn unregister(&self, ty: &SideInputType) -> Option<InputConstructor> {
        self.constructors.lock().remove(ty)
    }

    /// All registered types, sorted
    pub fn types(&self) -> Vec<SideInputType> {
        let mut types: Vec<SideInputType> = self.constructors.lock().keys().cloned().collect();
        types.sort();
        types
    }

    /// Number of registered constructors
    pub fn len(&self) -> usize {
        self.constructors.lock().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.constructors.lock().is_empty()
    }
}

impl std::fmt::Debug for InputRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types: Vec<String> = self.types().iter().map(|t| t.to_string()).collect();
        f.debug_struct("InputRegistry")
            .field("constructor_count", &types.len())
            .field("types", &types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FixedValue;
    use crate::input::SideValue;
    use sideinput_core::{IterSignature, Value, ValueType};

    struct NoStream;

    impl ElementStream for NoStream {
        fn open(&self) -> sideinput_core::StreamResult<Box<dyn sideinput_core::Cursor>> {
            Err(sideinput_core::StreamError::Unavailable("unused".into()))
        }
    }

    fn int_iter() -> SideInputType {
        SideInputType::Iter(IterSignature::values(ValueType::Int))
    }

    fn fixed_ctor(v: i64) -> impl Fn(Arc<dyn ElementStream>) -> Box<dyn ReusableInput> + Send + Sync {
        move |_: Arc<dyn ElementStream>| -> Box<dyn ReusableInput> {
            Box::new(FixedValue::new(Value::Int(v)))
        }
    }

    fn fetched(ctor: &InputConstructor) -> Value {
        let mut input = ctor(Arc::new(NoStream));
        input.init().unwrap();
        match input.fetch().unwrap() {
            SideValue::Fixed(v) => v.clone(),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_registry_new() {
        let registry = InputRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.is_registered(&int_iter()));
    }

    #[test]
    fn test_registry_register_and_lookup() {
        let registry = InputRegistry::new();
        registry.register(int_iter(), fixed_ctor(1));

        assert!(registry.is_registered(&int_iter()));
        assert!(!registry.is_registered(&SideInputType::Iter(IterSignature::values(
            ValueType::String
        ))));
        let ctor = registry.lookup(&int_iter()).unwrap();
        assert_eq!(fetched(&ctor), Value::Int(1));
    }

    #[test]
    fn test_registry_last_registration_wins() {
        let registry = InputRegistry::new();
        registry.register(int_iter(), fixed_ctor(1));
        registry.register(int_iter(), fixed_ctor(2));

        assert_eq!(registry.len(), 1);
        let ctor = registry.lookup(&int_iter()).unwrap();
        assert_eq!(fetched(&ctor), Value::Int(2));
    }

    #[test]
    fn test_registry_types_sorted_and_unregister() {
        let registry = InputRegistry::new();
        let reiter = SideInputType::ReIter(IterSignature::values(ValueType::Int));
        registry.register(reiter.clone(), fixed_ctor(0));
        registry.register(int_iter(), fixed_ctor(0));

        assert_eq!(registry.types(), vec![int_iter(), reiter.clone()]);
        assert!(registry.unregister(&reiter).is_some());
        assert!(registry.unregister(&reiter).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_debug() {
        let registry = InputRegistry::new();
        registry.register(int_iter(), fixed_ctor(0));
        let debug = format!("{:?}", registry);
        assert!(debug.contains("InputRegistry"));
        assert!(debug.contains("func(*int) bool"));
    }
}
