//! Record-level types delivered by element streams
//!
//! This module defines:
//! - EventTime: millisecond-precision event timestamp
//! - Window: the time-scoped partition keyed state is stored under
//! - ElementRecord: one record read from a cursor
//! - ProcessContext: opaque execution context passed through to adapters

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Value;

/// Event timestamp in milliseconds since Unix epoch
///
/// ## Invariants
///
/// - Values are clamped to `[EventTime::MIN, EventTime::MAX]` by the
///   checked constructors
/// - Timestamps are comparable and orderable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventTime(i64);

impl EventTime {
    /// Smallest representable event time
    pub const MIN: EventTime = EventTime(i64::MIN / 1_000);

    /// Largest representable event time
    pub const MAX: EventTime = EventTime(i64::MAX / 1_000);

    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: EventTime = EventTime(0);

    /// Create an event time from milliseconds since epoch, clamped to range
    pub const fn from_millis(millis: i64) -> Self {
        if millis < Self::MIN.0 {
            Self::MIN
        } else if millis > Self::MAX.0 {
            Self::MAX
        } else {
            EventTime(millis)
        }
    }

    /// Milliseconds since Unix epoch
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Convert from a UTC datetime (sub-millisecond precision is truncated)
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_millis(dt.timestamp_millis())
    }

    /// Convert to a UTC datetime
    ///
    /// Returns `None` for times outside chrono's representable range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

/// Window under which keyed side-input state is stored
///
/// Windows are opaque to the engine: they are only handed to the
/// side-input adapter to scope state lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Window {
    /// The single window spanning all of time
    Global,
    /// Half-open interval `[start, end)`
    Interval {
        /// Inclusive start
        start: EventTime,
        /// Exclusive end
        end: EventTime,
    },
}

impl Window {
    /// Create an interval window
    pub fn interval(start: EventTime, end: EventTime) -> Self {
        Window::Interval { start, end }
    }

    /// Largest timestamp that belongs to this window
    pub fn max_timestamp(&self) -> EventTime {
        match self {
            Window::Global => EventTime::MAX,
            Window::Interval { end, .. } => EventTime::from_millis(end.as_millis() - 1),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Global => write!(f, "[*]"),
            Window::Interval { start, end } => {
                write!(f, "[{}:{})", start.as_millis(), end.as_millis())
            }
        }
    }
}

/// One record delivered by an element stream
///
/// `secondary` is present only for key/value-shaped data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Primary value (the element, or the key of a key/value pair)
    pub primary: Value,
    /// Secondary value (the value of a key/value pair)
    pub secondary: Option<Value>,
    /// Event timestamp
    pub timestamp: EventTime,
}

impl ElementRecord {
    /// Create a single-valued record
    pub fn new(primary: impl Into<Value>, timestamp: EventTime) -> Self {
        ElementRecord {
            primary: primary.into(),
            secondary: None,
            timestamp,
        }
    }

    /// Create a key/value record
    pub fn keyed(key: impl Into<Value>, value: impl Into<Value>, timestamp: EventTime) -> Self {
        ElementRecord {
            primary: key.into(),
            secondary: Some(value.into()),
            timestamp,
        }
    }
}

/// Execution context of the invocation that owns a side input
///
/// Passed through untouched to the side-input adapter. The engine only
/// uses it to label log events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProcessContext {
    /// Identifier of the bundle-processing instruction
    pub instruction_id: String,
    /// Identifier of the transform consuming the side input
    pub transform_id: String,
}

impl ProcessContext {
    /// Create a context
    pub fn new(instruction_id: impl Into<String>, transform_id: impl Into<String>) -> Self {
        ProcessContext {
            instruction_id: instruction_id.into(),
            transform_id: transform_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_time_clamps() {
        assert_eq!(EventTime::from_millis(i64::MIN), EventTime::MIN);
        assert_eq!(EventTime::from_millis(i64::MAX), EventTime::MAX);
        assert_eq!(EventTime::from_millis(42).as_millis(), 42);
    }

    #[test]
    fn test_event_time_datetime_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let t = EventTime::from_datetime(dt);
        assert_eq!(t.to_datetime(), Some(dt));
        assert_eq!(t.to_string(), "2024-03-01T12:00:00.000Z");
    }

    #[test]
    fn test_window_max_timestamp() {
        let w = Window::interval(EventTime::from_millis(0), EventTime::from_millis(1000));
        assert_eq!(w.max_timestamp(), EventTime::from_millis(999));
        assert_eq!(Window::Global.max_timestamp(), EventTime::MAX);
        assert_eq!(w.to_string(), "[0:1000)");
    }

    #[test]
    fn test_record_constructors() {
        let r = ElementRecord::keyed(7, "x", EventTime::EPOCH);
        assert_eq!(r.primary, Value::Int(7));
        assert_eq!(r.secondary, Some(Value::String("x".into())));

        let single = ElementRecord::new(1, EventTime::EPOCH);
        assert!(single.secondary.is_none());
    }
}
