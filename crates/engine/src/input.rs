//! The reusable side-input contract
//!
//! Every materialization strategy implements [`ReusableInput`]:
//!
//! ```text
//! Uninitialized --init--> Initialized --reset--> Reset
//!                              ^                   |
//!                              +-------init--------+
//! ```
//!
//! `fetch` is only legal while initialized. What it returns depends on the
//! declared shape, see [`SideValue`].

use sideinput_core::{EventTime, Value};

use crate::error::{Result, SideInputError};
use crate::iter::IterFn;
use crate::multimap::MultiMapFn;
use crate::reiter::ReIterFn;

/// A resettable side-input value
///
/// Owned by one invocation at a time (or a pooled slot reused by the same
/// step); implementations need no internal synchronization.
pub trait ReusableInput: Send + std::fmt::Debug {
    /// Prepare the value before the user function runs
    fn init(&mut self) -> Result<()>;

    /// The value or callable handed to user code
    fn fetch(&mut self) -> Result<SideValue<'_>>;

    /// Release resources after the user function returns
    fn reset(&mut self) -> Result<()>;
}

/// What a side input exposes to user code
pub enum SideValue<'a> {
    /// Precomputed value
    Fixed(&'a Value),
    /// Single-pass iterator callable
    Iter(IterFn<'a>),
    /// Factory of fresh iterators
    ReIter(ReIterFn<'a>),
    /// Keyed lookup returning iterators
    MultiMap(MultiMapFn<'a>),
}

impl<'a> SideValue<'a> {
    /// Shape name of this value
    pub fn shape_name(&self) -> &'static str {
        match self {
            SideValue::Fixed(_) => "singleton",
            SideValue::Iter(_) => "iter",
            SideValue::ReIter(_) => "re-iter",
            SideValue::MultiMap(_) => "multimap",
        }
    }

    /// The fixed value, if this is one
    pub fn as_fixed(&self) -> Option<&'a Value> {
        match self {
            SideValue::Fixed(v) => Some(v),
            _ => None,
        }
    }

    /// Unwrap an iterator callable
    pub fn into_iter_fn(self) -> Result<IterFn<'a>> {
        match self {
            SideValue::Iter(f) => Ok(f),
            other => Err(other.wrong_shape("iter")),
        }
    }

    /// Unwrap a re-iterable factory callable
    pub fn into_reiter_fn(self) -> Result<ReIterFn<'a>> {
        match self {
            SideValue::ReIter(f) => Ok(f),
            other => Err(other.wrong_shape("re-iter")),
        }
    }

    /// Unwrap a multimap callable
    pub fn into_multimap_fn(self) -> Result<MultiMapFn<'a>> {
        match self {
            SideValue::MultiMap(f) => Ok(f),
            other => Err(other.wrong_shape("multimap")),
        }
    }

    fn wrong_shape(&self, expected: &'static str) -> SideInputError {
        SideInputError::illegal_shape(
            self.shape_name(),
            sideinput_core::ShapeError::WrongShape {
                expected,
                actual: self.shape_name().to_string(),
            },
        )
    }
}

impl std::fmt::Debug for SideValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SideValue::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            other => f.debug_tuple(other.shape_name()).finish(),
        }
    }
}

/// One output slot filled by an iterator callable
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Record timestamp, for `EventTime` slots
    Time(EventTime),
    /// Converted key or value
    Value(Value),
}

impl Default for Field {
    fn default() -> Self {
        Field::Value(Value::Null)
    }
}

impl Field {
    /// Timestamp, if this is a time slot
    pub fn as_time(&self) -> Option<EventTime> {
        match self {
            Field::Time(t) => Some(*t),
            Field::Value(_) => None,
        }
    }

    /// Value, if this is a key or value slot
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(v) => Some(v),
            Field::Time(_) => None,
        }
    }

    /// Take the value out of a key or value slot
    pub fn into_value(self) -> Option<Value> {
        match self {
            Field::Value(v) => Some(v),
            Field::Time(_) => None,
        }
    }
}

impl From<Value> for Field {
    fn from(v: Value) -> Self {
        Field::Value(v)
    }
}

impl From<EventTime> for Field {
    fn from(t: EventTime) -> Self {
        Field::Time(t)
    }
}
