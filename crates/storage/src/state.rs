//! In-memory keyed side-input state
//!
//! Values are stored per `(side_input_id, window)` partition, then per key.
//! Keys are compared with `Value` equality, so `Int(1)` and `Float(1.0)`
//! are distinct keys.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use sideinput_core::{
    Cursor, ElementRecord, EventTime, ProcessContext, StateReader, StreamResult, Value, Window,
};
use tracing::trace;

use crate::memory::MemoryCursor;

type Partition = Vec<(Value, Vec<ElementRecord>)>;

/// Keyed multimap state, readable through [`StateReader`]
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    partitions: RwLock<BTreeMap<(String, Window), Partition>>,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value for `key`, timestamped at the window's max timestamp
    pub fn insert(&self, side_input_id: &str, window: Window, key: impl Into<Value>, value: impl Into<Value>) {
        let ts = window.max_timestamp();
        self.insert_at(side_input_id, window, key, value, ts);
    }

    /// Append one value for `key` with an explicit timestamp
    pub fn insert_at(
        &self,
        side_input_id: &str,
        window: Window,
        key: impl Into<Value>,
        value: impl Into<Value>,
        timestamp: EventTime,
    ) {
        let key = key.into();
        let record = ElementRecord::new(value, timestamp);
        let mut partitions = self.partitions.write();
        let partition = partitions
            .entry((side_input_id.to_string(), window))
            .or_default();
        match partition.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(record),
            None => partition.push((key, vec![record])),
        }
    }

    /// Append several values for `key`
    pub fn extend<I, V>(&self, side_input_id: &str, window: Window, key: impl Into<Value>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let key = key.into();
        for v in values {
            self.insert(side_input_id, window, key.clone(), v);
        }
    }

    /// Values stored for `(side_input_id, window, key)`, in insertion order
    pub fn get(&self, side_input_id: &str, window: &Window, key: &Value) -> Vec<ElementRecord> {
        self.partitions
            .read()
            .get(&(side_input_id.to_string(), *window))
            .and_then(|p| p.iter().find(|(k, _)| k == key))
            .map(|(_, values)| values.clone())
            .unwrap_or_default()
    }

    /// Number of distinct keys stored for `(side_input_id, window)`
    pub fn key_count(&self, side_input_id: &str, window: &Window) -> usize {
        self.partitions
            .read()
            .get(&(side_input_id.to_string(), *window))
            .map_or(0, |p| p.len())
    }

    /// Remove all state
    pub fn clear(&self) {
        self.partitions.write().clear();
    }
}

impl StateReader for MemoryStateStore {
    fn open_multimap(
        &self,
        ctx: &ProcessContext,
        side_input_id: &str,
        window: &Window,
        key: &Value,
    ) -> StreamResult<Box<dyn Cursor>> {
        let records = self.get(side_input_id, window, key);
        trace!(
            target: "sideinput::storage",
            instruction = %ctx.instruction_id,
            side_input = side_input_id,
            window = %window,
            values = records.len(),
            "Opened multimap state"
        );
        Ok(Box::new(MemoryCursor::new(Arc::new(records))))
    }
}
