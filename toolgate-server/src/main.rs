// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Toolgate — local authentication proxy for CLI tools
//
//  Pipeline:  /cli → plugin → policy → credential → intercept | subprocess
//  Config:    strict JSON5 file (mode 0600), plugins keyed by name
//  Logging:   tracing with secret-masking writer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use toolgate_core::{ProxyConfig, http};
use toolgate_observability::{MaskingMakeWriter, collect_secrets};
use toolgate_plugin::PluginRegistry;
use toolgate_proxy::{AppState, serve};
use tracing::info;

/// Fallback port when neither the flag nor the config sets one.
const DEFAULT_PORT: u16 = 8766;

#[derive(Parser, Debug)]
#[command(
    name = "toolgate",
    version,
    about = "Toolgate — local authentication proxy for CLI tools"
)]
struct Cli {
    /// Path to configuration file (JSON5, mode 0600)
    #[arg(long)]
    config: PathBuf,

    /// Port override (default: from config, else 8766)
    #[arg(long)]
    port: Option<u16>,

    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Config (fatal on structural or permission violations) ──
    let config = ProxyConfig::load(&cli.config)?;

    // ── Tracing through the masking writer ──
    let secrets = collect_secrets(&serde_json::to_value(&config)?);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .with_writer(MaskingMakeWriter::new(secrets))
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "Toolgate starting"
    );

    // ── Shared outbound HTTP client ──
    let client = http::build_client(config.timeouts.http)?;

    // ── Plugins (config-driven discovery) ──
    let mut registry = PluginRegistry::new();
    toolgate_plugins::register_all(&mut registry)?;
    let plugins = registry.discover(&config)?;
    info!(plugins = plugins.len(), "Plugins configured");

    let port = cli.port.or(config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::new(cli.host, port);

    let state = AppState::new(config, plugins, client);
    serve(addr, state, shutdown_signal()).await?;

    info!("Toolgate stopped");
    Ok(())
}

/// Resolve on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received, stopping...");
}
