//! Cache Engine
//!
//! Combines the local [`Store`] with the [`Replicator`]. Local writes are
//! committed first and then handed to the replicator; writes arriving from a
//! peer are committed only.
//!
//! ## Write Discipline
//! A single coarse lock serializes `add`, `delete` and `apply_replicated`
//! against each other, so two writers of the same key never interleave and
//! local observers see one total order per key. Reads never take the lock.
//!
//! Broadcasts are started while the lock is held, which keeps the dispatch
//! order equal to the commit order. Dispatch only spawns tasks, so the lock is
//! never held across network I/O.

use crate::config::NodeConfig;
use crate::replication::protocol::MutationEvent;
use crate::replication::replicator::{DeliveryStats, Replicator};
use crate::storage::memory::{Entry, Store, render_entries};

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

pub struct CacheEngine {
    store: Store,
    replicator: Replicator,
    write_lock: Mutex<()>,
    /// Bumped after every committed mutation.
    changes: watch::Sender<u64>,
}

impl CacheEngine {
    pub fn new(store: Store, replicator: Replicator) -> Arc<Self> {
        let (changes, _) = watch::channel(0);
        Arc::new(Self {
            store,
            replicator,
            write_lock: Mutex::new(()),
            changes,
        })
    }

    pub fn from_config(config: &NodeConfig) -> Result<Arc<Self>> {
        let replicator = Replicator::new(
            config.node_id.clone(),
            &config.peers,
            config.delivery_timeout,
            config.max_in_flight,
        )?;
        Ok(Self::new(Store::new(), replicator))
    }

    /// An engine without peers.
    pub fn standalone(node_id: &str) -> Arc<Self> {
        Self::new(Store::new(), Replicator::standalone(node_id))
    }

    pub fn node_id(&self) -> &str {
        self.replicator.node_id()
    }

    pub fn replicator(&self) -> &Replicator {
        &self.replicator
    }

    pub fn delivery_stats(&self) -> DeliveryStats {
        self.replicator.stats()
    }

    /// Inserts or overwrites `key` locally, then forwards the upsert to every peer.
    pub async fn add(&self, key: String, value: String) {
        let _guard = self.write_lock.lock().await;

        self.store.put(key.clone(), value.clone());
        self.mark_changed();
        tracing::info!("Added '{}' on {}", key, self.node_id());

        self.replicator.broadcast(&MutationEvent::Upsert { key, value });
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    /// Removes `key` locally, then forwards the delete to every peer.
    ///
    /// Deleting an absent key succeeds and is still forwarded, since a peer may hold it.
    pub async fn delete(&self, key: String) {
        let _guard = self.write_lock.lock().await;

        if self.store.remove(&key) {
            self.mark_changed();
            tracing::info!("Deleted '{}' on {}", key, self.node_id());
        } else {
            tracing::debug!("Delete of absent key '{}' on {}", key, self.node_id());
        }

        self.replicator.broadcast(&MutationEvent::Delete { key });
    }

    /// Commits a mutation forwarded by a peer. Never forwards it again.
    pub async fn apply_replicated(&self, event: MutationEvent, origin: Option<&str>) {
        let origin = origin.unwrap_or("unknown peer");
        let _guard = self.write_lock.lock().await;

        match event {
            MutationEvent::Upsert { key, value } => {
                tracing::debug!("Applying replicated upsert of '{}' from {}", key, origin);
                self.store.put(key, value);
                self.mark_changed();
            }
            MutationEvent::Delete { key } => {
                tracing::debug!("Applying replicated delete of '{}' from {}", key, origin);
                if self.store.remove(&key) {
                    self.mark_changed();
                }
            }
        }
    }

    pub fn snapshot(&self) -> Vec<Entry> {
        self.store.snapshot()
    }

    /// The snapshot as newline-terminated `key=value` lines.
    pub fn render_snapshot(&self) -> String {
        render_entries(&self.store.snapshot())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Receiver whose value moves every time a mutation is committed.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub fn version(&self) -> u64 {
        *self.changes.borrow()
    }

    fn mark_changed(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}
