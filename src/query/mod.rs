//! Query dispatch for personaldb.
//!
//! This module splits request bodies into statements and runs them through
//! classification and execution, independent of the HTTP layer.

mod batch;
pub mod executor;

pub use batch::{split_batch, BatchSummary};
pub use executor::Dispatcher;
