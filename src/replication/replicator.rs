//! Peer Fan-out
//!
//! Forwards one mutation to every configured peer. Each delivery is a single
//! HTTP request running in its own task, bounded by a timeout, and never
//! retried. The caller is never told the outcome; it is logged and counted.
//!
//! In-flight deliveries share a semaphore. When a peer is down and every permit
//! is held by a pending request, further deliveries are dropped instead of
//! piling up.

use super::protocol::{ENDPOINT_REPLICATE, MutationEvent, ORIGIN_HEADER, upsert_payload};

use anyhow::Result;
use reqwest::Url;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

/// Point-in-time view of the delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Deliveries handed to a task.
    pub dispatched: u64,
    /// Deliveries acknowledged with a 2xx.
    pub delivered: u64,
    /// Deliveries that errored, timed out or got a non-2xx answer.
    pub failed: u64,
    /// Deliveries skipped because the in-flight cap was reached.
    pub dropped: u64,
}

impl DeliveryStats {
    /// Dispatched deliveries that have not finished yet.
    pub fn pending(&self) -> u64 {
        self.dispatched
            .saturating_sub(self.delivered)
            .saturating_sub(self.failed)
    }
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

pub struct Replicator {
    node_id: String,
    peers: Vec<Url>,
    http_client: reqwest::Client,
    timeout: Duration,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
    counters: Arc<Counters>,
}

impl Replicator {
    /// Creates a replicator for a fixed peer set.
    ///
    /// Peers may be given as `host:port` or as a full base URL.
    pub fn new(
        node_id: impl Into<String>,
        peers: &[String],
        timeout: Duration,
        max_in_flight: usize,
    ) -> Result<Self> {
        let peers = peers
            .iter()
            .map(|raw| normalize_peer(raw))
            .collect::<Result<Vec<_>>>()?;
        let max_in_flight = max_in_flight.max(1);

        Ok(Self {
            node_id: node_id.into(),
            peers,
            http_client: reqwest::Client::new(),
            timeout,
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            counters: Arc::new(Counters::default()),
        })
    }

    /// A replicator with no peers. Broadcasts are no-ops.
    pub fn standalone(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            peers: Vec::new(),
            http_client: reqwest::Client::new(),
            timeout: DEFAULT_DELIVERY_TIMEOUT,
            permits: Arc::new(Semaphore::new(1)),
            max_in_flight: 1,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn peers(&self) -> &[Url] {
        &self.peers
    }

    pub fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    /// Starts one delivery per peer and returns without waiting for any of them.
    ///
    /// Must be called from within a tokio runtime.
    pub fn broadcast(&self, event: &MutationEvent) {
        for peer in &self.peers {
            let Ok(permit) = self.permits.clone().try_acquire_owned() else {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "Dropping {} of '{}' to {}: {} deliveries already in flight",
                    event.kind(),
                    event.key(),
                    peer,
                    self.max_in_flight
                );
                continue;
            };

            self.counters.dispatched.fetch_add(1, Ordering::Relaxed);

            let request = match self.build_request(peer, event) {
                Ok(request) => request,
                Err(e) => {
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("Failed to build request for {}: {}", peer, e);
                    continue;
                }
            };

            let counters = self.counters.clone();
            let peer = peer.clone();
            let kind = event.kind();
            let key = event.key().to_string();

            tokio::spawn(async move {
                let _permit = permit;

                match request.send().await {
                    Ok(response) if response.status().is_success() => {
                        counters.delivered.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!("Replicated {} of '{}' to {}", kind, key, peer);
                    }
                    Ok(response) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(
                            "Peer {} rejected {} of '{}': {}",
                            peer,
                            kind,
                            key,
                            response.status()
                        );
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("Error replicating {} of '{}' to {}: {}", kind, key, peer, e);
                    }
                }
            });
        }
    }

    fn build_request(&self, peer: &Url, event: &MutationEvent) -> Result<reqwest::RequestBuilder> {
        let endpoint = ENDPOINT_REPLICATE.trim_start_matches('/');

        let request = match event {
            MutationEvent::Upsert { key, value } => self
                .http_client
                .post(endpoint_url(peer, &[endpoint])?)
                .json(&upsert_payload(key, value)),
            MutationEvent::Delete { key } => {
                // In the query, since dot segments like `..` are dropped from paths
                let mut url = endpoint_url(peer, &[endpoint])?;
                url.query_pairs_mut().append_pair("key", key);
                self.http_client.delete(url)
            }
        };

        Ok(request
            .header(ORIGIN_HEADER, self.node_id.as_str())
            .timeout(self.timeout))
    }
}

/// Turns `host:port` or `http://host:port/` into a base URL without a trailing slash.
pub fn normalize_peer(raw: &str) -> Result<Url> {
    let cleaned = raw.trim().trim_end_matches('/');
    if cleaned.is_empty() {
        return Err(anyhow::anyhow!("Empty peer address"));
    }

    let with_scheme = if cleaned.contains("://") {
        cleaned.to_string()
    } else {
        format!("http://{}", cleaned)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| anyhow::anyhow!("Invalid peer address '{}': {}", raw, e))?;
    if url.cannot_be_a_base() {
        return Err(anyhow::anyhow!("Peer address '{}' cannot be a base URL", raw));
    }
    Ok(url)
}

/// Appends percent-encoded path segments to a peer base URL.
fn endpoint_url(peer: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = peer.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Peer address {} cannot be a base URL", peer))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
