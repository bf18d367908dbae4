//! Storage layer for side inputs
//!
//! This crate implements the collaborators the engine consumes:
//! - MemoryStream: restartable element stream over shared records
//! - MemoryStateStore: keyed side-input state scoped by window
//! - StateBackedAdapter: builds per-(window, key) streams from a state reader
//! - testing: fault-injecting streams for error-path tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod memory;
pub mod state;
pub mod testing;

pub use adapter::{KeyedStateStream, StateBackedAdapter};
pub use memory::{MemoryCursor, MemoryStream};
pub use state::MemoryStateStore;
