//! mcphost server entry point.
//!
//! Loads configuration, initializes logging, registers the bundled plugin
//! modules, and runs the host until shutdown.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use mcphost_core::AppConfig;
use mcphost_core::AppResult;
use mcphost_plugin::PluginLoader;

/// mcphost plugin host server
#[derive(Debug, Parser)]
#[command(name = "mcphost-server", version, about, long_about = None)]
struct Args {
    /// Directory holding default.toml and environment overlays
    #[arg(short, long, default_value = "config")]
    config_dir: String,

    /// Environment overlay to apply
    #[arg(short, long, default_value = "development")]
    env: String,

    /// Plugin definitions file, overriding `plugins.config_path`
    #[arg(long)]
    plugins: Option<String>,

    /// Listen port, overriding `server.port`
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_configuration(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        config_dir = %args.config_dir,
        env = %args.env,
        "Starting mcphost v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = mcphost_api::run_server(config, plugin_loader()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration and apply command line overrides
fn load_configuration(args: &Args) -> AppResult<AppConfig> {
    let mut config = AppConfig::load(&args.config_dir, &args.env)?;

    if let Some(plugins) = &args.plugins {
        config.plugins.config_path = Some(plugins.clone());
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    Ok(config)
}

/// Plugin modules compiled into this binary
fn plugin_loader() -> PluginLoader {
    PluginLoader::new().with_module(plugin_request_tag::MODULE)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
