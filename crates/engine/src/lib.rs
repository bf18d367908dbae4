//! Side-input materialization engine
//!
//! Turns side-input data into the value or callable a user function
//! declared. Four shapes are supported:
//! - Fixed: a precomputed singleton value
//! - Iter: a single-pass callable over an element stream
//! - ReIter: a factory producing fresh passes over the same stream
//! - MultiMap: a keyed lookup returning a pass over the values for a key
//!
//! Every strategy implements [`ReusableInput`] (`init`, `fetch`, `reset`)
//! so the worker can pool and reuse it across invocations. Specialized
//! constructors can be installed in the [`InputRegistry`]; otherwise the
//! engine builds generic iterators from the declared signature.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod fixed;
pub mod input;
pub mod iter;
pub mod multimap;
pub mod registry;
pub mod reiter;
pub mod slot;

pub use builder::SpawnedIter;
pub use config::{EngineConfig, CONFIG_FILE_NAME};
pub use engine::{SideInputEngine, SideInputSource};
pub use error::{ErrorKind, Result, SideInputError};
pub use fixed::FixedValue;
pub use input::{Field, ReusableInput, SideValue};
pub use iter::{IterFn, IterValue, OpenIter};
pub use multimap::{KeyedSource, MultiMapFn, MultiMapValue};
pub use registry::{InputConstructor, InputRegistry};
pub use reiter::{ReIterFn, ReIterValue};
pub use slot::SideInputSlot;
