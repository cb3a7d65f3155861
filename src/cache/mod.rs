//! Cache Module
//!
//! The externally visible read/write API of a node.
//!
//! ## Operations
//! - **Add / Delete**: commit to the local store, then fan out to every peer (fire-and-forget).
//! - **Get / Snapshot**: served from the local store only.
//! - **Apply replicated**: commit a mutation received from a peer without forwarding it,
//!   which keeps a fully connected topology from bouncing writes forever.
//!
//! ## Consistency
//! Eventual and best-effort. Each node applies mutations in its own arrival order
//! (last write wins per receiving node); nothing orders writes across nodes.
//!
//! ## Submodules
//! - **`engine`**: `CacheEngine`, the store + replicator pair and its write lock.
//! - **`handlers`**: Axum handlers for `/add`, `/get`, `/delete`, `/replicate` (POST upserts, DELETE `?key=`) and `/getCacheContent`.

pub mod engine;
pub mod handlers;

pub use engine::CacheEngine;
