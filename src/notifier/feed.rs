//! Snapshot Feed
//!
//! Every subscriber gets its own producer task and its own bounded channel.
//! The producer renders the full store on each trigger and offers it to the
//! channel without waiting: a subscriber that is not keeping up simply misses
//! frames, it never slows the engine or another subscriber.
//!
//! A producer stops when its subscriber drops the stream or when the notifier
//! is shut down, and releases its channel and engine handle on exit.

use crate::cache::engine::CacheEngine;
use crate::config::{FeedConfig, FeedMode};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::ReceiverStream;

pub struct ChangeNotifier {
    engine: Arc<CacheEngine>,
    config: FeedConfig,
    shutdown: watch::Sender<bool>,
    active: Arc<AtomicUsize>,
}

/// Keeps the live-subscriber count accurate however the producer exits.
struct SubscriberGuard(Arc<AtomicUsize>);

impl SubscriberGuard {
    fn new(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(active)
    }
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ChangeNotifier {
    pub fn new(engine: Arc<CacheEngine>, config: FeedConfig) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            engine,
            config,
            shutdown,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn active_subscribers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Stops every producer. New subscriptions end immediately.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
        tracing::info!("Update feed shut down");
    }

    /// Starts a producer and returns its stream of rendered snapshots.
    ///
    /// The first frame is sent right away. After that frames follow the
    /// configured [`FeedMode`].
    pub fn subscribe(&self) -> ReceiverStream<String> {
        let (tx, rx) = mpsc::channel(self.config.buffer.max(1));
        let engine = self.engine.clone();
        let config = self.config.clone();
        let mut shutdown = self.shutdown.subscribe();
        let mut changes = engine.subscribe_changes();
        let guard = SubscriberGuard::new(self.active.clone());

        tokio::spawn(async move {
            let _guard = guard;
            let mut ticker = tokio::time::interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            changes.borrow_and_update();

            tracing::debug!("Subscriber attached to {} ({:?})", engine.node_id(), config.mode);

            loop {
                if *shutdown.borrow_and_update() {
                    break;
                }

                tokio::select! {
                    _ = tx.closed() => break,
                    stopped = shutdown.changed() => {
                        if stopped.is_err() {
                            break;
                        }
                        continue;
                    }
                    _ = ticker.tick() => {}
                    changed = changes.changed(), if config.mode == FeedMode::OnChange => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                match tx.try_send(engine.render_snapshot()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::trace!("Subscriber lagging, frame skipped");
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }

            tracing::debug!("Subscriber detached from {}", engine.node_id());
        });

        ReceiverStream::new(rx)
    }
}
