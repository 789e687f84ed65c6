//! # minikv
//!
//! A small networked key-value store. Requests arrive as fixed-format
//! array frames, are executed against an in-memory keyspace of strings and
//! hashes, and every accepted write is appended verbatim to a log that is
//! replayed on startup.

pub mod command;
pub mod config;
pub mod error;
pub mod persistence;
pub mod resp;
pub mod server;
pub mod store;
