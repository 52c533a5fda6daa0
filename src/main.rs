//! httpdump: print the HTTP traffic of TCP connections as readable records.
//!
//! ```text
//!   tap:     client ──▶ relay ──▶ upstream
//!                         │ tee (per direction)
//!   replay:  file ────────┤
//!                         ▼
//!                  FlowDispatcher ──▶ FlowStreamConsumer ──▶ MessagePresenter ──▶ sink
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use clap::{Parser, Subcommand};

use httpdump::config::{load_config, validate_config, ConfigError, ConfigWatcher, DumpConfig};
use httpdump::http::{Endpoints, SequenceAllocator};
use httpdump::lifecycle::{wait_for_signal, Shutdown};
use httpdump::net::Tap;
use httpdump::observability::{logging, metrics};
use httpdump::output::{OutputSink, WriterSink};
use httpdump::render::MessagePresenter;
use httpdump::stream::{replay_file, FlowDispatcher};

#[derive(Parser)]
#[command(name = "httpdump")]
#[command(about = "Reconstruct and print HTTP messages from TCP streams", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON and XML bodies
    #[arg(long, global = true)]
    pretty: Option<bool>,

    /// Log level for diagnostics on stderr (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append records to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay TCP connections to an upstream and print their HTTP traffic
    Tap {
        /// Address to accept clients on
        #[arg(short, long)]
        listen: Option<String>,

        /// Server to relay to, as host:port
        #[arg(short, long)]
        upstream: Option<String>,

        #[arg(long)]
        max_connections: Option<usize>,
    },
    /// Read one direction of a captured TCP stream from a file
    Replay {
        file: PathBuf,

        /// Source endpoint, as host:port
        #[arg(long, default_value = "0.0.0.0:0")]
        src: String,

        /// Destination endpoint, as host:port
        #[arg(long, default_value = "0.0.0.0:0")]
        dst: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("httpdump v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let sink: Arc<dyn OutputSink> = if config.output.path.is_empty() {
        Arc::new(WriterSink::stdout())
    } else {
        Arc::new(WriterSink::append_to_file(Path::new(&config.output.path))?)
    };

    let settings = Arc::new(ArcSwap::from_pointee(config.render.clone()));
    let presenter = MessagePresenter::new(sink, Arc::clone(&settings));
    let dispatcher = FlowDispatcher::new(Arc::new(SequenceAllocator::new()), presenter);

    // Keep the watcher alive for the whole run.
    let _watcher = match (&cli.config, config.watch) {
        (Some(path), true) => {
            let (watcher, mut updates) = ConfigWatcher::new(path, &config.render, cli.pretty);
            let handle = watcher.run()?;
            tokio::spawn(async move {
                while let Some(render) = updates.recv().await {
                    settings.store(Arc::new(render));
                }
            });
            Some(handle)
        }
        _ => None,
    };

    match cli.command {
        Commands::Tap { .. } => {
            let tap = Tap::bind(&config.tap, dispatcher).await?;
            let shutdown = Shutdown::new();
            let stopped = shutdown.subscribe();

            tokio::spawn(async move {
                wait_for_signal().await;
                shutdown.trigger();
            });

            tap.run(stopped).await?;
        }
        Commands::Replay { file, src, dst } => {
            let endpoints = Endpoints::parse(&src, &dst);
            replay_file(&file, endpoints, &dispatcher).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Load the config file (or defaults), then apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<DumpConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DumpConfig::default(),
    };

    if let Some(pretty) = cli.pretty {
        config.render.pretty = pretty;
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    if let Some(output) = &cli.output {
        config.output.path = output.to_string_lossy().into_owned();
    }
    if let Commands::Tap {
        listen,
        upstream,
        max_connections,
    } = &cli.command
    {
        if let Some(listen) = listen {
            config.tap.bind_address = listen.clone();
        }
        if let Some(upstream) = upstream {
            config.tap.upstream_address = upstream.clone();
        }
        if let Some(max) = max_connections {
            config.tap.max_connections = *max;
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
