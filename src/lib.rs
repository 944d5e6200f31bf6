//! personaldb - run batches of SQL against an embedded SQLite database over HTTP.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod safety;
pub mod server;
