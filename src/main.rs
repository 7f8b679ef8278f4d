use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

use gatekeeper::config::{GatekeeperConfig, LogFormat, LoggingConfig};
use gatekeeper::http::HttpServer;
use gatekeeper::ratelimit::RateLimiter;

/// Command line arguments. Flags override values from the config file.
#[derive(Parser, Debug)]
#[command(name = "gatekeeper")]
#[command(about = "Per-client sliding-window rate limiting service")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to serve HTTP on
    #[arg(short, long)]
    addr: Option<SocketAddr>,

    /// Requests admitted per client within one window
    #[arg(long)]
    max_requests: Option<u64>,

    /// Window length in seconds
    #[arg(long)]
    window_seconds: Option<u64>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = GatekeeperConfig::load(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        config.server.http_addr = addr;
    }
    if let Some(max_requests) = args.max_requests {
        config.rate_limiting.max_requests = max_requests;
    }
    if let Some(window_seconds) = args.window_seconds {
        config.rate_limiting.window_seconds = window_seconds;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    config.validate()?;

    init_tracing(&config.logging);

    info!("Starting Gatekeeper Rate Limiting Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        http_addr = %config.server.http_addr,
        max_requests = config.rate_limiting.max_requests,
        window_seconds = config.rate_limiting.window_seconds,
        "Configuration loaded"
    );

    // Initialize the rate limiter
    let rate_limiter = Arc::new(RateLimiter::from_config(&config.rate_limiting));
    info!("Rate limiter initialized");

    if config.rate_limiting.sweep_interval_secs > 0 {
        let period = Duration::from_secs(config.rate_limiting.sweep_interval_secs);
        tokio::spawn(sweep_idle_keys(rate_limiter.clone(), period));
    }

    let server = HttpServer::new(config.server.http_addr, rate_limiter);

    // Run the server with graceful shutdown on Ctrl+C
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Gatekeeper Rate Limiting Service stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true);

    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Periodically forget clients with no requests left in their window.
async fn sweep_idle_keys(rate_limiter: Arc<RateLimiter>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        let removed = rate_limiter.sweep();
        trace!(
            removed = removed,
            tracked = rate_limiter.tracked_keys(),
            "Idle key sweep finished"
        );
    }
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
