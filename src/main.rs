//! pizzaz-mcp: MCP server for widget-backed tools
//!
//! Loads the compiled widget markup, binds it to the shipped tools and serves
//! them over stdio or HTTP.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use pizzaz_mcp::assets::load_artifacts;
use pizzaz_mcp::catalog::Catalog;
use pizzaz_mcp::config::{self, Config, TransportMode};
use pizzaz_mcp::error::ServerError;
use pizzaz_mcp::mcp::{http, Dispatcher, McpServer};
use pizzaz_mcp::pizzeria::MockPizzerias;
use pizzaz_mcp::tools::default_widgets;

/// MCP server for widget-backed tools.
///
/// Serves the pizza widgets and their HTML templates to Apps SDK hosts.
#[derive(Parser, Debug)]
#[command(name = "pizzaz-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Directory containing the compiled widget markup
    #[arg(long, value_name = "DIR")]
    assets_dir: Option<PathBuf>,

    /// Transport to serve on
    #[arg(long, value_enum)]
    transport: Option<TransportMode>,

    /// HTTP bind address
    #[arg(long)]
    host: Option<String>,

    /// HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, cfg: &mut Config) {
        if let Some(ref dir) = self.assets_dir {
            cfg.assets_dir.clone_from(dir);
        }
        if let Some(transport) = self.transport {
            cfg.transport = transport;
        }
        if let Some(ref host) = self.host {
            cfg.http.host.clone_from(host);
        }
        if let Some(port) = self.port {
            cfg.http.port = port;
        }
    }
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Always writes to stderr; stdout belongs to the stdio transport.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the pizzaz-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    args.apply(&mut cfg);
    if let Err(e) = cfg.validate() {
        eprintln!("Configuration error: {e}");
        return ExitCode::FAILURE;
    }

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!("pizzaz-mcp {}", env!("CARGO_PKG_VERSION"));
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        assets_dir = %cfg.assets_dir.display(),
        "Starting pizzaz-mcp server"
    );

    // Bind widgets to their compiled markup; any gap is fatal
    let artifacts = match load_artifacts(&cfg.assets_dir) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!(error = %e, "Failed to load widget assets");
            eprintln!("Asset error: {e}");
            eprintln!("Build the widgets first so that <name>-<hash>.html files exist.");
            return ExitCode::FAILURE;
        }
    };
    let catalog = match Catalog::new(default_widgets(Arc::new(MockPizzerias)), artifacts) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "Failed to build widget catalog");
            eprintln!("Catalog error: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(widgets = catalog.len(), "Widget catalog ready");

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(catalog)));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        match cfg.transport {
            TransportMode::Stdio => {
                info!("MCP server ready, waiting for client connection...");
                McpServer::new(dispatcher)
                    .run()
                    .await
                    .map_err(ServerError::Io)
            }
            TransportMode::Http => http::serve(dispatcher, &cfg.http).await,
        }
    });

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
