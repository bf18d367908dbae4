//! Pooled side-input slot
//!
//! A slot owns the reusable input for one side-input parameter of a step
//! and drives its lifecycle around each user call:
//!
//! ```text
//! init -> fetch -> user closure -> reset
//! ```
//!
//! `reset` always runs once `init` succeeded, including when the closure
//! fails. In that case the closure's error is returned and a close failure
//! is only logged.

use sideinput_core::SideInputType;
use tracing::{trace, warn};

use crate::error::SideInputError;
use crate::input::{ReusableInput, SideValue};

/// Reusable holder for one side-input parameter
pub struct SideInputSlot {
    ty: SideInputType,
    input: Box<dyn ReusableInput>,
    invocations: u64,
}

impl SideInputSlot {
    /// Wrap a constructed input
    pub fn new(ty: SideInputType, input: Box<dyn ReusableInput>) -> Self {
        SideInputSlot {
            ty,
            input,
            invocations: 0,
        }
    }

    /// Declared type of the parameter
    pub fn side_input_type(&self) -> &SideInputType {
        &self.ty
    }

    /// Number of completed or failed user calls
    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Run `f` with the fetched side value, resetting afterwards
    pub fn invoke<R, E>(
        &mut self,
        f: impl FnOnce(SideValue<'_>) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<SideInputError>,
    {
        self.input.init()?;
        self.invocations += 1;
        trace!(target: "sideinput::slot", ty = %self.ty, invocation = self.invocations, "Invoking");

        let outcome = match self.input.fetch() {
            Ok(value) => f(value),
            Err(e) => Err(E::from(e)),
        };
        let reset = self.input.reset();

        match (outcome, reset) {
            (Ok(r), Ok(())) => Ok(r),
            (Ok(_), Err(e)) => Err(E::from(e)),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close)) => {
                warn!(target: "sideinput::slot", ty = %self.ty, error = %close, "Reset failed after user error");
                Err(e)
            }
        }
    }

    /// Release the input
    pub fn into_inner(self) -> Box<dyn ReusableInput> {
        self.input
    }
}

impl std::fmt::Debug for SideInputSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SideInputSlot")
            .field("ty", &self.ty.to_string())
            .field("input", &self.input)
            .field("invocations", &self.invocations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::fixed::FixedValue;
    use crate::iter::IterValue;
    use sideinput_core::{
        DefaultConverter, ElementRecord, EventTime, IterSignature, ShapeDescriptor, Value,
        ValueType,
    };
    use sideinput_storage::testing::{FaultPlan, FaultyStream};
    use sideinput_storage::MemoryStream;
    use std::sync::Arc;

    fn int_iter_slot(stream: Arc<dyn sideinput_core::ElementStream>) -> SideInputSlot {
        let sig = IterSignature::values(ValueType::Int);
        let shape = ShapeDescriptor::from_signature(&sig).unwrap();
        let input = IterValue::new(sig.clone(), shape, stream, Arc::new(DefaultConverter));
        SideInputSlot::new(SideInputType::Iter(sig), Box::new(input))
    }

    fn sum(value: SideValue<'_>) -> Result<i64> {
        let mut total = 0;
        for row in value.into_iter_fn()? {
            total += row?[0].as_value().and_then(Value::as_int).unwrap_or(0);
        }
        Ok(total)
    }

    #[test]
    fn test_slot_is_reusable_across_calls() {
        let stream = Arc::new(MemoryStream::from_values([1, 2, 3]));
        let mut slot = int_iter_slot(stream.clone());
        assert_eq!(slot.invoke(sum).unwrap(), 6);
        assert_eq!(slot.invoke(sum).unwrap(), 6);
        assert_eq!(slot.invocations(), 2);
        assert_eq!(stream.open_count(), 2);
    }

    #[test]
    fn test_slot_resets_when_user_call_fails() {
        let records = vec![ElementRecord::new(1, EventTime::EPOCH)];
        let stream = Arc::new(FaultyStream::new(records, FaultPlan::default()));
        let mut slot = int_iter_slot(stream.clone());

        let err = slot
            .invoke(|_| -> Result<()> { Err(SideInputError::MissingSecondary) })
            .unwrap_err();
        assert!(matches!(err, SideInputError::MissingSecondary));
        assert_eq!(stream.close_count(), 1);

        // The slot is usable again after the failed call
        assert_eq!(slot.invoke(sum).unwrap(), 1);
    }

    #[test]
    fn test_user_error_wins_over_close_error() {
        let stream = Arc::new(FaultyStream::new(vec![], FaultPlan::default().fail_close()));
        let mut slot = int_iter_slot(stream);
        let err = slot
            .invoke(|_| -> Result<()> { Err(SideInputError::MissingSecondary) })
            .unwrap_err();
        assert!(matches!(err, SideInputError::MissingSecondary));
    }

    #[test]
    fn test_close_error_surfaces_after_success() {
        let stream = Arc::new(FaultyStream::new(vec![], FaultPlan::default().fail_close()));
        let mut slot = int_iter_slot(stream);
        let err = slot.invoke(sum).unwrap_err();
        assert!(matches!(err, SideInputError::Close(_)));
    }

    #[test]
    fn test_init_failure_skips_user_call() {
        let stream = Arc::new(FaultyStream::new(vec![], FaultPlan::default().fail_open()));
        let mut slot = int_iter_slot(stream);
        let mut called = false;
        let err = slot
            .invoke(|_| -> Result<()> {
                called = true;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, SideInputError::StreamOpen(_)));
        assert!(!called);
        assert_eq!(slot.invocations(), 0);
    }

    #[derive(Debug)]
    enum UserError {
        SideInput(SideInputError),
        Rejected,
    }

    impl From<SideInputError> for UserError {
        fn from(e: SideInputError) -> Self {
            UserError::SideInput(e)
        }
    }

    #[test]
    fn test_caller_error_type() {
        let mut slot = SideInputSlot::new(
            SideInputType::Singleton(ValueType::Int),
            Box::new(FixedValue::new(Value::Int(4))),
        );
        let doubled = slot
            .invoke(|v| -> std::result::Result<i64, UserError> {
                Ok(v.as_fixed().and_then(Value::as_int).unwrap_or(0) * 2)
            })
            .unwrap();
        assert_eq!(doubled, 8);

        let err = slot
            .invoke(|_| -> std::result::Result<(), UserError> { Err(UserError::Rejected) })
            .unwrap_err();
        assert!(matches!(err, UserError::Rejected));

        let err = slot
            .invoke(|v| -> std::result::Result<(), UserError> {
                v.into_iter_fn()?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, UserError::SideInput(SideInputError::IllegalShape { .. })));
        assert_eq!(slot.invocations(), 3);
    }
}
