//! Change Notifier Module
//!
//! Keeps any number of live subscribers in sync with the store by pushing full
//! snapshots over server-sent events (`/updates`).
//!
//! ## Feed Model
//! - **Interval**: a snapshot every tick (one second by default), changed or not.
//! - **OnChange**: a snapshot as soon as a mutation commits, bursts coalesced,
//!   plus the periodic frame as keep-alive.
//!
//! Frames are whole snapshots, never diffs. Subscribers see coalesced state, not
//! an event log.
//!
//! ## Submodules
//! - **`feed`**: `ChangeNotifier` and the per-subscriber producer tasks.
//! - **`handlers`**: The SSE handler.

pub mod feed;
pub mod handlers;

pub use feed::ChangeNotifier;
