//! State-backed side-input adapter
//!
//! The adapter does not read state when a stream is requested. It returns a
//! lazy `KeyedStateStream` that asks the state reader for a fresh cursor on
//! every `open`, which keeps the stream restartable.

use std::sync::Arc;

use sideinput_core::{
    Cursor, ElementStream, ProcessContext, SideInputAdapter, StateReader, StreamResult, Value,
    Window,
};
use tracing::debug;

/// Adapter serving one multimap side input from a [`StateReader`]
#[derive(Debug, Clone)]
pub struct StateBackedAdapter {
    side_input_id: String,
}

impl StateBackedAdapter {
    /// Create an adapter for the side input `side_input_id`
    pub fn new(side_input_id: impl Into<String>) -> Self {
        StateBackedAdapter {
            side_input_id: side_input_id.into(),
        }
    }

    /// Side input this adapter serves
    pub fn side_input_id(&self) -> &str {
        &self.side_input_id
    }
}

impl SideInputAdapter for StateBackedAdapter {
    fn new_keyed_iterable(
        &self,
        ctx: &ProcessContext,
        reader: Arc<dyn StateReader>,
        window: &Window,
        key: Value,
    ) -> StreamResult<Arc<dyn ElementStream>> {
        debug!(
            target: "sideinput::storage",
            side_input = %self.side_input_id,
            window = %window,
            key_type = key.type_name(),
            "Built keyed iterable"
        );
        Ok(Arc::new(KeyedStateStream {
            ctx: ctx.clone(),
            reader,
            side_input_id: self.side_input_id.clone(),
            window: *window,
            key,
        }))
    }
}

/// Restartable stream over the values stored for one `(window, key)`
pub struct KeyedStateStream {
    ctx: ProcessContext,
    reader: Arc<dyn StateReader>,
    side_input_id: String,
    window: Window,
    key: Value,
}

impl KeyedStateStream {
    /// Key this stream is scoped to
    pub fn key(&self) -> &Value {
        &self.key
    }

    /// Window this stream is scoped to
    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl ElementStream for KeyedStateStream {
    fn open(&self) -> StreamResult<Box<dyn Cursor>> {
        self.reader
            .open_multimap(&self.ctx, &self.side_input_id, &self.window, &self.key)
    }
}

impl std::fmt::Debug for KeyedStateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedStateStream")
            .field("side_input_id", &self.side_input_id)
            .field("window", &self.window)
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStateStore;
    use sideinput_core::EventTime;

    #[test]
    fn test_keyed_stream_reads_stored_values_on_every_open() {
        let store = Arc::new(MemoryStateStore::new());
        store.extend("side", Window::Global, "k", ["x", "y"]);

        let adapter = StateBackedAdapter::new("side");
        let stream = adapter
            .new_keyed_iterable(&ProcessContext::default(), store, &Window::Global, Value::from("k"))
            .unwrap();

        for _ in 0..2 {
            let mut cur = stream.open().unwrap();
            assert_eq!(cur.read().unwrap().unwrap().primary, Value::from("x"));
            assert_eq!(cur.read().unwrap().unwrap().primary, Value::from("y"));
            assert!(cur.read().unwrap().is_none());
            cur.close().unwrap();
        }
    }

    #[test]
    fn test_stream_sees_state_written_after_creation() {
        let store = Arc::new(MemoryStateStore::new());
        let adapter = StateBackedAdapter::new("side");
        let w = Window::interval(EventTime::from_millis(0), EventTime::from_millis(10));
        let stream = adapter
            .new_keyed_iterable(&ProcessContext::default(), store.clone(), &w, Value::Int(1))
            .unwrap();

        store.insert("side", w, 1, "late");
        let mut cur = stream.open().unwrap();
        assert_eq!(cur.read().unwrap().unwrap().primary, Value::from("late"));
    }
}
