use clap::Parser;
use ferrous_relay_domain::{CliOverrides, LogFormat};
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "ferrous-relay")]
#[command(version)]
#[command(about = "Ferrous Relay - DNS forwarding proxy with per-domain upstream routing")]
struct Cli {
    /// Configuration file path (JSON or TOML)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address shared by the UDP and TCP listeners
    #[arg(short = 'l', long, value_name = "HOST:PORT")]
    listen: Option<String>,

    /// Per-attempt upstream deadline in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (text, json)
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        listen: cli.listen,
        query_timeout_ms: cli.timeout_ms,
        log_level: cli.log_level,
        log_format: cli.log_format,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Ferrous Relay v{}", env!("CARGO_PKG_VERSION"));

    let services = di::DnsServices::new(&config)?;

    let listen = config.server.listen.clone();
    let handler = services.handler.clone();
    let idle_timeout = config.server.tcp_idle_timeout();

    tokio::select! {
        result = server::start_dns_server(&listen, handler, idle_timeout) => {
            if let Err(e) = result {
                error!(error = %e, "DNS server error");
                services.metrics.log_summary();
                return Err(e);
            }
        }
        signal = server::shutdown_signal() => {
            info!(signal, "Received shutdown signal");
        }
    }

    services.metrics.log_summary();
    info!("Server shutdown complete");
    Ok(())
}
