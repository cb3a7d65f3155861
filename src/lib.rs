//! Replicated Cache Library
//!
//! An in-memory key/value cache served over HTTP whose writes are forwarded,
//! best-effort, to a fixed set of peer nodes, and whose contents can be watched
//! live over server-sent events. The binary (`main.rs`) only parses flags and
//! starts a node.
//!
//! ## Architecture Modules
//! - **`storage`**: The local concurrent map and its snapshots.
//! - **`replication`**: Wire protocol and the fire-and-forget peer fan-out.
//! - **`cache`**: `CacheEngine`, which commits writes locally and hands them to the
//!   replicator, plus the HTTP handlers of the read/write API.
//! - **`notifier`**: Per-subscriber snapshot feeds behind `/updates`.
//! - **`config`**: Startup configuration and flag parsing.
//! - **`server`**: Router assembly and serving on several ports at once.

pub mod cache;
pub mod config;
pub mod error;
pub mod notifier;
pub mod replication;
pub mod server;
pub mod storage;
