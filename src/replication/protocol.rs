//! Replication Network Protocol
//!
//! Defines the endpoints and payloads a node uses to forward a local mutation
//! to its peers.
//!
//! Upserts travel as a JSON object of key/value pairs, deletes as a `DELETE`
//! with the key in the `key` query parameter. Both carry the sender's node id in [`ORIGIN_HEADER`].

use std::collections::HashMap;

// --- API Endpoints ---

/// Public endpoint for client writes.
pub const ENDPOINT_ADD: &str = "/add";
/// Public endpoint for client reads.
pub const ENDPOINT_GET: &str = "/get";
/// Public endpoint for client deletes.
pub const ENDPOINT_DELETE: &str = "/delete";
/// Peer endpoint receiving forwarded mutations: `POST` upserts, `DELETE ?key=` deletes.
/// Applied without re-forwarding.
pub const ENDPOINT_REPLICATE: &str = "/replicate";
/// Full store dump as `key=value` lines.
pub const ENDPOINT_CACHE_CONTENT: &str = "/getCacheContent";
/// Server-sent-events feed of store snapshots.
pub const ENDPOINT_UPDATES: &str = "/updates";

/// Header naming the node a replicated mutation came from.
pub const ORIGIN_HEADER: &str = "x-cache-origin";

// --- Mutation Events ---

/// One store change to be replicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
    Upsert { key: String, value: String },
    Delete { key: String },
}

impl MutationEvent {
    pub fn upsert(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Upsert {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self::Delete { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Upsert { key, .. } | Self::Delete { key } => key,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upsert { .. } => "upsert",
            Self::Delete { .. } => "delete",
        }
    }
}

// --- Data Transfer Objects ---

/// Body of a forwarded upsert: `{"key": "value", ...}`.
pub type ReplicatePayload = HashMap<String, String>;

/// Builds the upsert body for a single key.
pub fn upsert_payload(key: &str, value: &str) -> ReplicatePayload {
    HashMap::from([(key.to_string(), value.to_string())])
}

/// Parses a forwarded upsert body into events.
pub fn parse_replicate_payload(body: &[u8]) -> serde_json::Result<Vec<MutationEvent>> {
    let payload: ReplicatePayload = serde_json::from_slice(body)?;
    Ok(payload
        .into_iter()
        .map(|(key, value)| MutationEvent::Upsert { key, value })
        .collect())
}
