//! Fixed side-input value
//!
//! Wraps a value that is already materialized, such as a singleton global
//! side input. `init` and `reset` do nothing.

use sideinput_core::Value;

use crate::error::Result;
use crate::input::{ReusableInput, SideValue};

/// Precomputed side-input value
#[derive(Debug, Clone, PartialEq)]
pub struct FixedValue {
    value: Value,
}

impl FixedValue {
    /// Wrap `value`
    pub fn new(value: Value) -> Self {
        FixedValue { value }
    }

    /// The wrapped value
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl ReusableInput for FixedValue {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn fetch(&mut self) -> Result<SideValue<'_>> {
        Ok(SideValue::Fixed(&self.value))
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}
