use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tradewatch::logging::{LogMakeWriter, LogStore, SharedLogStore};
use tradewatch::TuiOpts;
use tradewatch_application::config::{self, Config, FeedSource};

#[derive(Parser, Debug)]
#[command(name = "tradewatch")]
#[command(about = "Live trading feed dashboard + headless replay runner.", version)]
struct Cli {
    /// Run without the TUI: replay the feed, print a JSON summary and exit.
    #[arg(long)]
    headless: bool,

    /// Config file path (TOML). If omitted, uses env TRADEWATCH_CONFIG, then built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read the feed from a recorded JSON-lines file instead of the live socket.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Live feed url (ws:// or wss://); overrides feed.url.
    #[arg(long, conflicts_with = "replay")]
    url: Option<String>,
}

enum LogTarget {
    Console(SharedLogStore),
    Stderr,
}

fn main() {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let log_store = Arc::new(parking_lot::Mutex::new(LogStore::new(
        config.ui.console_lines,
    )));
    let target = if cli.headless {
        LogTarget::Stderr
    } else {
        LogTarget::Console(log_store.clone())
    };
    if let Err(err) = init_tracing(target) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = init_metrics() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    if cli.headless {
        match tradewatch::headless::run_headless(&config) {
            Ok(json) => {
                println!(
                    "{}",
                    serde_json::to_string(&json)
                        .unwrap_or_else(|_| "{\"status\":\"error\",\"error\":\"json\"}".to_string())
                );
                std::process::exit(0);
            }
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    }

    let opts = TuiOpts {
        config: Arc::new(config),
        log_store,
    };
    if let Err(err) = tradewatch::run(opts) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn resolve_config(cli: &Cli) -> Result<Config, String> {
    let path = cli.config.clone().or_else(|| {
        std::env::var("TRADEWATCH_CONFIG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    });
    let mut config = match path {
        Some(path) => config::load_config(&path)?,
        None => Config::default(),
    };

    if let Some(replay) = &cli.replay {
        config.feed.source = FeedSource::Replay;
        config.feed.replay_path = Some(replay.display().to_string());
    }
    if let Some(url) = &cli.url {
        config.feed.source = FeedSource::Websocket;
        config.feed.url = url.clone();
    }
    config::validate(&config).map_err(|err| format!("invalid settings: {err}"))?;
    Ok(config)
}

fn init_tracing(target: LogTarget) -> Result<(), String> {
    let filter = std::env::var("TRADEWATCH_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    match target {
        LogTarget::Console(store) => builder
            .with_ansi(false)
            .with_writer(LogMakeWriter::new(store))
            .init(),
        LogTarget::Stderr => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

#[cfg(feature = "prometheus")]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = std::env::var("TRADEWATCH_METRICS_ADDR").ok() else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let addr: SocketAddr = raw
        .parse()
        .map_err(|err| format!("invalid TRADEWATCH_METRICS_ADDR (expected host:port): {err}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    Ok(None)
}
