//! Gatekeeper server binary.
//!
//! Reads configuration from a TOML file (`~/.config/gatekeeper/config.toml`
//! by default, or `GATEKEEPER_CONFIG`), then runs until SIGINT/SIGTERM.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use gatekeeper::server::{init_tracing, ServerHandle, ServerOptions};
use gatekeeper::{default_config_path, AppConfig};

#[derive(Debug, Parser)]
#[command(name = "gatekeeper", version, about = "Geofenced personnel and fleet access control")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "GATEKEEPER_CONFIG")]
    config: Option<PathBuf>,

    /// Override `server.api_port`
    #[arg(long)]
    api_port: Option<u16>,

    /// Override `logging.level` (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup
    #[arg(long)]
    no_migrate: bool,

    /// Do not create the default admin account
    #[arg(long)]
    no_admin: bool,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    let mut app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid configuration {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = cli.api_port {
        app_cfg.server.api_port = port;
    }
    if let Some(level) = cli.log_level.clone() {
        app_cfg.logging.level = level;
    }

    if cli.check {
        println!("Configuration OK: {}", config_path.display());
        return ExitCode::SUCCESS;
    }
    if cli.write_config {
        return match app_cfg.save(&config_path) {
            Ok(()) => {
                println!("Configuration written to {}", config_path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    init_tracing(&app_cfg);
    info!("Configuration loaded from {}", config_path.display());

    let handle = match ServerHandle::start(ServerOptions {
        config: app_cfg,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");
    handle.wait().await;
    ExitCode::SUCCESS
}
