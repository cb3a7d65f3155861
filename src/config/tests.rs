//! Configuration Tests
//!
//! Covers defaults and command-line parsing, including the error paths that abort startup.

#[cfg(test)]
mod tests {
    use crate::config::{FeedMode, NodeConfig};
    use std::net::SocketAddr;
    use std::time::Duration;

    #[test]
    fn test_defaults_mirror_three_port_layout() {
        let config = NodeConfig::default();

        assert_eq!(config.listen.len(), 3);
        assert_eq!(config.listen[0], "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.peers, vec!["http://localhost:8081", "http://localhost:8082"]);
        assert_eq!(config.feed.mode, FeedMode::Interval);
        assert_eq!(config.feed.interval, Duration::from_secs(1));
        assert!(!config.node_id.is_empty());
    }

    #[test]
    fn test_empty_args_give_defaults() {
        let config = NodeConfig::from_args(Vec::<String>::new()).unwrap();

        assert_eq!(config.listen.len(), 3);
        assert_eq!(config.peers.len(), 2);
    }

    #[test]
    fn test_parse_all_flags() {
        let config = NodeConfig::from_args([
            "--listen", "127.0.0.1:9000",
            "--listen", "127.0.0.1:9001",
            "--peer", "10.0.0.2:9000",
            "--node-id", "node-a",
            "--timeout-ms", "750",
            "--max-in-flight", "32",
            "--feed-interval-ms", "250",
            "--feed-mode", "on-change",
            "--log-level", "debug",
        ])
        .unwrap();

        assert_eq!(config.listen.len(), 2);
        assert_eq!(config.peers, vec!["10.0.0.2:9000"]);
        assert_eq!(config.node_id, "node-a");
        assert_eq!(config.delivery_timeout, Duration::from_millis(750));
        assert_eq!(config.max_in_flight, 32);
        assert_eq!(config.feed.interval, Duration::from_millis(250));
        assert_eq!(config.feed.mode, FeedMode::OnChange);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_no_peers_flag_clears_peer_list() {
        let config = NodeConfig::from_args(["--no-peers"]).unwrap();

        assert!(config.peers.is_empty());
    }

    #[test]
    fn test_invalid_arguments_are_errors() {
        assert!(NodeConfig::from_args(["--listen"]).is_err(), "missing value");
        assert!(NodeConfig::from_args(["--listen", "not-an-addr"]).is_err());
        assert!(NodeConfig::from_args(["--timeout-ms", "soon"]).is_err());
        assert!(NodeConfig::from_args(["--timeout-ms", "0"]).is_err());
        assert!(NodeConfig::from_args(["--feed-mode", "push"]).is_err());
        assert!(NodeConfig::from_args(["--max-in-flight", "0"]).is_err());
        assert!(NodeConfig::from_args(["--bogus", "1"]).is_err());
    }

    #[test]
    fn test_standalone_config() {
        let config = NodeConfig::standalone("solo");

        assert_eq!(config.node_id, "solo");
        assert!(config.peers.is_empty());
        assert_eq!(config.listen[0].port(), 0);
        assert!(config.validate().is_ok());
    }
}
