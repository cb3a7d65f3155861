//! Local Storage Module
//!
//! Holds the authoritative key/value state of a single node.
//!
//! ## Core Concepts
//! - **Store**: A concurrent string map. Writes overwrite, deletes are idempotent.
//! - **Snapshot**: A fully materialized copy of every entry, used by `/getCacheContent`
//!   and by the live update feed.
//!
//! The store knows nothing about peers; replication is layered on top by the `cache` engine.

pub mod memory;

pub use memory::{Entry, Store, render_entries};
