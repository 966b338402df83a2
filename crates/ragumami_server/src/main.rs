//! Ragumami RAG API server binary.

use clap::Parser;
use ragumami_server::{
    AppConfig, ObservabilityConfig, init_observability, run, shutdown_observability,
    shutdown_signal,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "ragumami-server",
    about = "Chat and SQL generation API for Umami Analytics",
    version = env!("CARGO_PKG_VERSION")
)]
struct ServerArgs {
    /// Configuration file (replaces ./ragumami.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    port: Option<u16>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    let args = ServerArgs::parse();

    let config = AppConfig::load(args.config.as_deref())?.with_address(args.host, args.port);

    let observability = ObservabilityConfig::from_settings(config.logging());
    let json_logs = observability.json_logs || args.json_logs;
    init_observability(&observability.with_json_logs(json_logs))?;

    let result = run(config, shutdown_signal()).await;
    shutdown_observability();
    Ok(result?)
}
