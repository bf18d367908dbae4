//! In-memory element streams
//!
//! `MemoryStream` shares its records behind an `Arc`, so every `open`
//! produces an independent cursor without copying the data.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sideinput_core::{Cursor, ElementRecord, ElementStream, EventTime, StreamError, StreamResult, Value};
use tracing::trace;

/// Restartable stream over a fixed list of records
#[derive(Debug, Default)]
pub struct MemoryStream {
    records: Arc<Vec<ElementRecord>>,
    opens: AtomicUsize,
}

impl MemoryStream {
    /// Create a stream over `records`
    pub fn new(records: Vec<ElementRecord>) -> Self {
        MemoryStream {
            records: Arc::new(records),
            opens: AtomicUsize::new(0),
        }
    }

    /// Create a stream of single values, all at `EventTime::EPOCH`
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(
            values
                .into_iter()
                .map(|v| ElementRecord::new(v, EventTime::EPOCH))
                .collect(),
        )
    }

    /// Create a stream of key/value pairs, all at `EventTime::EPOCH`
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| ElementRecord::keyed(k, v, EventTime::EPOCH))
                .collect(),
        )
    }

    /// Records served by every cursor
    pub fn records(&self) -> &[ElementRecord] {
        &self.records
    }

    /// Number of cursors opened so far
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }
}

impl ElementStream for MemoryStream {
    fn open(&self) -> StreamResult<Box<dyn Cursor>> {
        let n = self.opens.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(target: "sideinput::storage", records = self.records.len(), opens = n, "Opened memory cursor");
        Ok(Box::new(MemoryCursor::new(Arc::clone(&self.records))))
    }
}

/// Cursor over shared records
#[derive(Debug)]
pub struct MemoryCursor {
    records: Arc<Vec<ElementRecord>>,
    pos: usize,
    closed: bool,
}

impl MemoryCursor {
    /// Create a cursor positioned at the first record
    pub fn new(records: Arc<Vec<ElementRecord>>) -> Self {
        MemoryCursor {
            records,
            pos: 0,
            closed: false,
        }
    }

    /// Create a cursor with no records
    pub fn empty() -> Self {
        Self::new(Arc::new(Vec::new()))
    }

    /// Number of records read so far
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Cursor for MemoryCursor {
    fn read(&mut self) -> StreamResult<Option<ElementRecord>> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        let rec = self.records.get(self.pos).cloned();
        if rec.is_some() {
            self.pos += 1;
        }
        Ok(rec)
    }

    fn close(&mut self) -> StreamResult<()> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cursor_reads_in_order_then_ends() {
        let stream = MemoryStream::from_values([1, 2, 3]);
        let mut cur = stream.open().unwrap();
        for expected in 1..=3 {
            let rec = cur.read().unwrap().unwrap();
            assert_eq!(rec.primary, Value::Int(expected));
        }
        assert!(cur.read().unwrap().is_none());
        assert!(cur.read().unwrap().is_none());
        cur.close().unwrap();
    }

    #[test]
    fn test_opens_are_independent() {
        let stream = MemoryStream::from_values(["a", "b"]);
        let mut first = stream.open().unwrap();
        first.read().unwrap();
        first.read().unwrap();

        let mut second = stream.open().unwrap();
        assert_eq!(second.read().unwrap().unwrap().primary, Value::from("a"));
        assert_eq!(stream.open_count(), 2);
    }

    #[test]
    fn test_closed_cursor_rejects_reads() {
        let mut cur = MemoryCursor::empty();
        cur.close().unwrap();
        assert!(matches!(cur.read(), Err(StreamError::Closed)));
        assert!(matches!(cur.close(), Err(StreamError::Closed)));
    }

    #[test]
    fn test_pairs_carry_secondary() {
        let stream = MemoryStream::from_pairs([("k", 1)]);
        let rec = &stream.records()[0];
        assert_eq!(rec.primary, Value::from("k"));
        assert_eq!(rec.secondary, Some(Value::Int(1)));
    }

    proptest! {
        #[test]
        fn prop_interleaved_cursors_each_see_every_record(
            values in prop::collection::vec(any::<i64>(), 0..32),
            picks in prop::collection::vec(any::<bool>(), 0..96),
        ) {
            let stream = MemoryStream::from_values(values.clone());
            let mut cursors = [stream.open().unwrap(), stream.open().unwrap()];
            let mut seen: [Vec<i64>; 2] = [Vec::new(), Vec::new()];
            for pick in picks {
                let i = usize::from(pick);
                if let Some(rec) = cursors[i].read().unwrap() {
                    seen[i].push(rec.primary.as_int().unwrap());
                }
            }
            for i in 0..2 {
                while let Some(rec) = cursors[i].read().unwrap() {
                    seen[i].push(rec.primary.as_int().unwrap());
                }
                prop_assert_eq!(&seen[i], &values);
            }
        }
    }
}
