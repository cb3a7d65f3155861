//! HTTP Surface
//!
//! Builds the router and serves it on every configured address. All listeners
//! share one engine and one notifier, so a write on any port is visible on all
//! of them.

use crate::cache::engine::CacheEngine;
use crate::cache::handlers::{
    handle_add, handle_cache_content, handle_delete, handle_get, handle_replicate,
    handle_replicate_delete,
};
use crate::config::NodeConfig;
use crate::notifier::feed::ChangeNotifier;
use crate::notifier::handlers::handle_updates;
use crate::replication::protocol::{
    ENDPOINT_ADD, ENDPOINT_CACHE_CONTENT, ENDPOINT_DELETE, ENDPOINT_GET, ENDPOINT_REPLICATE,
    ENDPOINT_UPDATES,
};

use anyhow::Result;
use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub fn router(engine: Arc<CacheEngine>, notifier: Arc<ChangeNotifier>) -> Router {
    Router::new()
        .route(ENDPOINT_ADD, get(handle_add))
        .route(ENDPOINT_GET, get(handle_get))
        .route(ENDPOINT_DELETE, get(handle_delete))
        .route(
            ENDPOINT_REPLICATE,
            post(handle_replicate).delete(handle_replicate_delete),
        )
        .route(ENDPOINT_CACHE_CONTENT, get(handle_cache_content))
        .route(ENDPOINT_UPDATES, get(handle_updates))
        .layer(Extension(engine))
        .layer(Extension(notifier))
}

/// Binds every address up front. Any failure aborts startup.
pub async fn bind_all(addrs: &[SocketAddr]) -> Result<Vec<TcpListener>> {
    let mut listeners = Vec::with_capacity(addrs.len());
    for addr in addrs {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
        listeners.push(listener);
    }
    Ok(listeners)
}

/// A node serving on one or more listeners.
pub struct RunningNode {
    pub engine: Arc<CacheEngine>,
    pub notifier: Arc<ChangeNotifier>,
    pub addrs: Vec<SocketAddr>,
    stop: watch::Sender<bool>,
    servers: Vec<JoinHandle<std::io::Result<()>>>,
}

impl RunningNode {
    /// Base URL of the node's own (first) port.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addrs[0])
    }

    /// Ends every feed, stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(self) -> Result<()> {
        self.notifier.shutdown();
        self.stop.send_replace(true);

        for server in self.servers {
            server.await??;
        }
        tracing::info!("Node {} stopped", self.engine.node_id());
        Ok(())
    }
}

pub async fn start(config: &NodeConfig) -> Result<RunningNode> {
    let listeners = bind_all(&config.listen).await?;
    start_on(config, listeners)
}

/// Starts a node on listeners bound by the caller.
pub fn start_on(config: &NodeConfig, listeners: Vec<TcpListener>) -> Result<RunningNode> {
    if listeners.is_empty() {
        return Err(anyhow::anyhow!("At least one listener is required"));
    }

    let engine = CacheEngine::from_config(config)?;
    let notifier = ChangeNotifier::new(engine.clone(), config.feed.clone());
    let app = router(engine.clone(), notifier.clone());
    let (stop, _) = watch::channel(false);

    let mut addrs = Vec::with_capacity(listeners.len());
    let mut servers = Vec::with_capacity(listeners.len());
    for listener in listeners {
        let addr = listener.local_addr()?;
        addrs.push(addr);

        let mut stopped = stop.subscribe();
        let app = app.clone();
        servers.push(tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stopped.wait_for(|stop| *stop).await;
                })
                .await
        }));
        tracing::info!("HTTP server listening on {}", addr);
    }

    tracing::info!(
        "Node {} replicating to {} peer(s)",
        engine.node_id(),
        engine.replicator().peers().len()
    );

    Ok(RunningNode {
        engine,
        notifier,
        addrs,
        stop,
        servers,
    })
}
