//! Task lifecycle engine.
//!
//! Client-side model for a four-state task workflow board: status codecs at
//! the wire boundary, an in-memory collection with derived statistics, a
//! pure filter/sort/pagination pipeline, optimistic mutations with rollback,
//! drag-and-drop transitions, and per-task subtask chains.

pub mod backend;
pub mod board;
pub mod collection;
pub mod config;
pub mod dragdrop;
pub mod error;
pub mod logging;
pub mod mutator;
pub mod notify;
pub mod paginator;
pub mod pipeline;
pub mod status;
pub mod subtask;
pub mod types;
