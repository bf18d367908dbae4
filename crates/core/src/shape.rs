//! Declared parameter shapes
//!
//! User functions declare side inputs as one of a closed set of shapes.
//! The shapes are modelled as data ([`SideInputType`]) selected when the
//! pipeline is constructed, so the engine never inspects function types at
//! element-processing time.
//!
//! | Shape | Function form |
//! |-------|---------------|
//! | `Singleton(T)` | `T` |
//! | `Iter(sig)` | `func(*A, *B, ...) bool` |
//! | `ReIter(sig)` | `func() func(*A, *B, ...) bool` |
//! | `MultiMap { key, iter }` | `func(K) func(*A, ...) bool` |
//!
//! A [`ShapeDescriptor`] is the role classification of an iterator
//! signature: which slot receives the timestamp, the key, and the value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ShapeError;

/// Declared type of a value slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Accepts any value unchanged
    Any,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// UTF-8 string
    String,
    /// Raw bytes
    Bytes,
    /// Array of values
    Array,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Any => "any",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Bytes => "bytes",
            ValueType::Array => "array",
        };
        f.write_str(name)
    }
}

/// Declared out-parameter of an iterator signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeclaredType {
    /// Event timestamp slot
    EventTime,
    /// Value slot of the given type
    Value(ValueType),
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::EventTime => f.write_str("*EventTime"),
            DeclaredType::Value(t) => write!(f, "*{}", t),
        }
    }
}

/// Ordered out-parameters of an iterator function `func(*A, *B, ...) bool`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IterSignature(Vec<DeclaredType>);

impl IterSignature {
    /// Create a signature from its declared out-parameters
    pub fn new(params: Vec<DeclaredType>) -> Self {
        IterSignature(params)
    }

    /// `func(*T) bool`
    pub fn values(t: ValueType) -> Self {
        IterSignature(vec![DeclaredType::Value(t)])
    }

    /// `func(*K, *V) bool`
    pub fn key_values(k: ValueType, v: ValueType) -> Self {
        IterSignature(vec![DeclaredType::Value(k), DeclaredType::Value(v)])
    }

    /// Prepend an event time slot: `func(*EventTime, ...) bool`
    pub fn timestamped(mut self) -> Self {
        self.0.insert(0, DeclaredType::EventTime);
        self
    }

    /// Declared out-parameters, in order
    pub fn params(&self) -> &[DeclaredType] {
        &self.0
    }

    /// Number of out-parameters
    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for IterSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("func(")?;
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        f.write_str(") bool")
    }
}

/// Declared type of a side-input parameter
///
/// This is the key of the input registry: two parameters share a
/// constructor only if their declared types are identical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SideInputType {
    /// A single materialized value
    Singleton(ValueType),
    /// Single-pass iterator
    Iter(IterSignature),
    /// Factory of fresh iterators
    ReIter(IterSignature),
    /// Keyed lookup yielding an iterator per key
    MultiMap {
        /// Declared key argument type
        key: ValueType,
        /// Signature of the returned iterator
        iter: IterSignature,
    },
}

impl SideInputType {
    /// Short shape name used in logs and errors
    pub fn shape_name(&self) -> &'static str {
        match self {
            SideInputType::Singleton(_) => "singleton",
            SideInputType::Iter(_) => "iter",
            SideInputType::ReIter(_) => "re-iter",
            SideInputType::MultiMap { .. } => "multimap",
        }
    }
}

impl fmt::Display for SideInputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideInputType::Singleton(t) => write!(f, "{}", t),
            SideInputType::Iter(sig) => write!(f, "{}", sig),
            SideInputType::ReIter(sig) => write!(f, "func() {}", sig),
            SideInputType::MultiMap { key, iter } => write!(f, "func({}) {}", key, iter),
        }
    }
}

/// Role of one slot of an iterator signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Receives the record timestamp
    EventTime,
    /// Receives the record's primary value
    Key(ValueType),
    /// Receives the record's secondary value
    Value(ValueType),
}

/// Ordered role classification of an iterator signature
///
/// ## Invariants
///
/// - Exactly one `Key` slot, and it precedes the `Value` slot
/// - At most one `Value` slot
/// - `EventTime` slots may appear anywhere
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeDescriptor {
    roles: Vec<FieldRole>,
}

impl ShapeDescriptor {
    /// Classify a signature into roles
    ///
    /// Event time slots are recognised by type; the first remaining slot is
    /// the key and the next one the value.
    pub fn from_signature(sig: &IterSignature) -> Result<Self, ShapeError> {
        let mut roles = Vec::with_capacity(sig.arity());
        let mut seen_key = false;
        let mut value_slots = 0usize;
        for param in sig.params() {
            match *param {
                DeclaredType::EventTime => roles.push(FieldRole::EventTime),
                DeclaredType::Value(t) if !seen_key => {
                    seen_key = true;
                    roles.push(FieldRole::Key(t));
                }
                DeclaredType::Value(t) => {
                    value_slots += 1;
                    roles.push(FieldRole::Value(t));
                }
            }
        }
        if !seen_key {
            return Err(ShapeError::NoKeySlot);
        }
        if value_slots > 1 {
            return Err(ShapeError::TooManyValueSlots(value_slots));
        }
        Ok(ShapeDescriptor { roles })
    }

    /// Slot roles, in declaration order
    pub fn roles(&self) -> &[FieldRole] {
        &self.roles
    }

    /// Number of slots the callable fills
    pub fn arity(&self) -> usize {
        self.roles.len()
    }

    /// Whether the shape reads the record's secondary value
    pub fn has_value_slot(&self) -> bool {
        self.roles.iter().any(|r| matches!(r, FieldRole::Value(_)))
    }
}
