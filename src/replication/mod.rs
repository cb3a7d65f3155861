//! Replication Module
//!
//! Best-effort propagation of local mutations to a static set of peers.
//!
//! ## Delivery Model
//! - **Fan-out**: every mutation is sent to every peer, each in its own task.
//! - **Fire-and-forget**: the caller has already committed the mutation locally and
//!   never waits for, or learns about, the outcome of a delivery.
//! - **No retry**: a failed delivery is logged, counted and dropped. Replicas that miss
//!   a mutation stay diverged; there is no reconciliation path.
//! - **Loop prevention**: a node receiving a forwarded mutation applies it without
//!   forwarding it again (see `cache::engine::CacheEngine::apply_replicated`).
//!
//! ## Submodules
//! - **`protocol`**: Endpoints, origin header, `MutationEvent` and the upsert payload.
//! - **`replicator`**: The per-peer delivery tasks and their counters.

pub mod protocol;
pub mod replicator;

pub use protocol::MutationEvent;
pub use replicator::{DeliveryStats, Replicator};
