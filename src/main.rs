use replicated_cache::config::NodeConfig;
use replicated_cache::server;
use std::time::Duration;

const STATS_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("replicated-cache");

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        eprintln!("{}", NodeConfig::usage(program));
        return Ok(());
    }

    let config = match NodeConfig::from_args(args.iter().skip(1).cloned()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", NodeConfig::usage(program));
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    tracing::info!("Starting node {}", config.node_id);
    if config.peers.is_empty() {
        tracing::info!("No peers configured, running standalone");
    } else {
        tracing::info!("Peers: {:?}", config.peers);
    }

    // 1. Bind every port and start serving:
    let node = server::start(&config).await?;

    // 2. Spawn stats reporter:
    let engine = node.engine.clone();
    let notifier = node.notifier.clone();
    let reporter = tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATS_INTERVAL);
        interval.tick().await;

        loop {
            interval.tick().await;
            let stats = engine.delivery_stats();
            tracing::info!(
                "Cache stats: {} entries, {} subscribers, deliveries ok={} failed={} dropped={} pending={}",
                engine.len(),
                notifier.active_subscribers(),
                stats.delivered,
                stats.failed,
                stats.dropped,
                stats.pending()
            );
        }
    });

    tracing::info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    reporter.abort();
    node.shutdown().await?;

    Ok(())
}
