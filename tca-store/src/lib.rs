//! # Test-Case Authoring Store
//!
//! Persistence for suites and tests:
//! - [`kv`]: key-value store abstraction with in-memory and JSON-file backends
//! - [`bootstrap`]: sample suites and tests used when storage is empty
//! - [`catalog`]: the suite/test data-access layer
//! - [`cli`]: command-line definitions for the `tca` binary

pub mod bootstrap;
pub mod catalog;
pub mod cli;
pub mod kv;

pub use catalog::{Catalog, SUITES_KEY, TESTS_KEY};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
