//! Fault injection for element streams
//!
//! `FaultyStream` serves records like [`MemoryStream`](crate::MemoryStream)
//! but can be told to fail at open, at a given read, or at close. Used to
//! exercise the engine's error paths.
//!
//! # Example
//!
//! ```ignore
//! use sideinput_storage::testing::{FaultPlan, FaultyStream};
//!
//! let stream = FaultyStream::new(records, FaultPlan::default().fail_read_at(2));
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sideinput_core::{Cursor, ElementRecord, ElementStream, StreamError, StreamResult};

/// Which operations a [`FaultyStream`] fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultPlan {
    /// Fail every `open`
    pub fail_open: bool,
    /// Fail the read with this zero-based index
    pub fail_read_at: Option<usize>,
    /// Fail every `close`
    pub fail_close: bool,
}

impl FaultPlan {
    /// Fail every open
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Fail the `index`-th read of each cursor
    pub fn fail_read_at(mut self, index: usize) -> Self {
        self.fail_read_at = Some(index);
        self
    }

    /// Fail every close
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

/// Stream that injects failures according to a [`FaultPlan`]
#[derive(Debug)]
pub struct FaultyStream {
    records: Arc<Vec<ElementRecord>>,
    plan: FaultPlan,
    closes: Arc<AtomicUsize>,
}

impl FaultyStream {
    /// Create a stream over `records` following `plan`
    pub fn new(records: Vec<ElementRecord>, plan: FaultPlan) -> Self {
        FaultyStream {
            records: Arc::new(records),
            plan,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of close calls observed across all cursors (failed ones included)
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl ElementStream for FaultyStream {
    fn open(&self) -> StreamResult<Box<dyn Cursor>> {
        if self.plan.fail_open {
            return Err(StreamError::Unavailable("injected open failure".to_string()));
        }
        Ok(Box::new(FaultyCursor {
            records: Arc::clone(&self.records),
            plan: self.plan,
            pos: 0,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct FaultyCursor {
    records: Arc<Vec<ElementRecord>>,
    plan: FaultPlan,
    pos: usize,
    closes: Arc<AtomicUsize>,
}

impl Cursor for FaultyCursor {
    fn read(&mut self) -> StreamResult<Option<ElementRecord>> {
        if self.plan.fail_read_at == Some(self.pos) {
            return Err(StreamError::Corrupt(format!("injected read failure at {}", self.pos)));
        }
        let rec = self.records.get(self.pos).cloned();
        self.pos += 1;
        Ok(rec)
    }

    fn close(&mut self) -> StreamResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.plan.fail_close {
            return Err(StreamError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected close failure",
            )));
        }
        Ok(())
    }
}
