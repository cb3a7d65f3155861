//! Node Configuration
//!
//! Everything a node needs at startup: where to listen, which peers to forward
//! mutations to, how long a single delivery may take and how the live feed
//! behaves. The peer set is static for the lifetime of the process.
//!
//! Configuration is read from command-line flags:
//!
//! ```text
//! replicated-cache --listen 127.0.0.1:8080 --listen 127.0.0.1:8081 \
//!                  --peer http://10.0.0.2:8080 --peer 10.0.0.3:8080 \
//!                  --feed-mode on-change --log-level debug
//! ```

use crate::replication::replicator::{DEFAULT_DELIVERY_TIMEOUT, DEFAULT_MAX_IN_FLIGHT};

use anyhow::Result;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_FEED_INTERVAL: Duration = Duration::from_secs(1);
/// Frames buffered per subscriber before new frames are skipped.
pub const DEFAULT_FEED_BUFFER: usize = 8;

const DEFAULT_LISTEN: [&str; 3] = ["127.0.0.1:8080", "127.0.0.1:8081", "127.0.0.1:8082"];
const DEFAULT_PEERS: [&str; 2] = ["http://localhost:8081", "http://localhost:8082"];

/// When the live feed pushes a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedMode {
    /// A frame every interval, whether or not anything changed.
    #[default]
    Interval,
    /// A frame whenever the store changes, plus one per interval as keep-alive.
    OnChange,
}

impl FromStr for FeedMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "interval" => Ok(Self::Interval),
            "on-change" | "on_change" => Ok(Self::OnChange),
            other => Err(anyhow::anyhow!(
                "Unknown feed mode '{}', expected 'interval' or 'on-change'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub mode: FeedMode,
    pub interval: Duration,
    pub buffer: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            mode: FeedMode::Interval,
            interval: DEFAULT_FEED_INTERVAL,
            buffer: DEFAULT_FEED_BUFFER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Sent to peers as the origin of forwarded mutations.
    pub node_id: String,
    /// Every address the HTTP surface is served on. The first one is the node's own port.
    pub listen: Vec<SocketAddr>,
    pub peers: Vec<String>,
    pub delivery_timeout: Duration,
    pub max_in_flight: usize,
    pub feed: FeedConfig,
    pub log_level: tracing::Level,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: uuid::Uuid::new_v4().to_string(),
            listen: DEFAULT_LISTEN
                .iter()
                .filter_map(|addr| addr.parse().ok())
                .collect(),
            peers: DEFAULT_PEERS.iter().map(|peer| peer.to_string()).collect(),
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            feed: FeedConfig::default(),
            log_level: tracing::Level::INFO,
        }
    }
}

impl NodeConfig {
    /// A single-node config with no peers, suitable for tests.
    pub fn standalone(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            listen: vec![SocketAddr::from(([127, 0, 0, 1], 0))],
            peers: Vec::new(),
            ..Default::default()
        }
    }

    /// Parses flags (without the program name). Repeated `--listen` / `--peer`
    /// flags replace the defaults rather than extending them.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut config = Self::default();
        let mut listen: Vec<SocketAddr> = vec![];
        let mut peers: Vec<String> = vec![];
        let mut no_peers = false;

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            if flag == "--no-peers" {
                no_peers = true;
                i += 1;
                continue;
            }

            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow::anyhow!("Missing value for {}", flag))?;

            match flag {
                "--listen" => listen.push(parse_value(flag, value)?),
                "--peer" => peers.push(value.clone()),
                "--node-id" => config.node_id = value.clone(),
                "--timeout-ms" => {
                    config.delivery_timeout = Duration::from_millis(parse_value(flag, value)?)
                }
                "--max-in-flight" => config.max_in_flight = parse_value(flag, value)?,
                "--feed-interval-ms" => {
                    config.feed.interval = Duration::from_millis(parse_value(flag, value)?)
                }
                "--feed-mode" => config.feed.mode = value.parse()?,
                "--log-level" => config.log_level = parse_value(flag, value)?,
                other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
            }
            i += 2;
        }

        if !listen.is_empty() {
            config.listen = listen;
        }
        if no_peers {
            config.peers.clear();
        } else if !peers.is_empty() {
            config.peers = peers;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.listen.is_empty() {
            return Err(anyhow::anyhow!("At least one listen address is required"));
        }
        if self.node_id.trim().is_empty() {
            return Err(anyhow::anyhow!("Node id must not be empty"));
        }
        if self.delivery_timeout.is_zero() {
            return Err(anyhow::anyhow!("Delivery timeout must be positive"));
        }
        if self.max_in_flight == 0 {
            return Err(anyhow::anyhow!("max-in-flight must be at least 1"));
        }
        if self.feed.interval.is_zero() {
            return Err(anyhow::anyhow!("Feed interval must be positive"));
        }
        Ok(())
    }

    pub fn usage(program: &str) -> String {
        format!(
            "Usage: {program} [--listen <addr:port>]... [--peer <url>]... [--no-peers]\n\
             \x20      [--node-id <id>] [--timeout-ms <n>] [--max-in-flight <n>]\n\
             \x20      [--feed-interval-ms <n>] [--feed-mode interval|on-change]\n\
             \x20      [--log-level <level>]\n\
             Example: {program} --listen 127.0.0.1:8080 --peer http://127.0.0.1:9080"
        )
    }
}

fn parse_value<T>(flag: &str, value: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: <T as FromStr>::Err| anyhow::anyhow!("Invalid value '{}' for {}: {}", value, flag, e))
}

#[cfg(test)]
mod tests;
