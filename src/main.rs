use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iaoms_audit::api::{self, AppState};
use iaoms_audit::audit::{open_store, AuditRecorder};
use iaoms_audit::config::AppConfig;
use iaoms_audit::rekor::RekorClient;

#[derive(Parser, Debug)]
#[command(name = "iaoms-audit", version, about = "IAOMS approval audit-trail service")]
struct Args {
    /// Configuration file (TOML or YAML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iaoms_audit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting IAOMS audit service");

    // Load configuration
    let config = AppConfig::load(args.config.as_deref())?;
    info!("Configuration loaded");

    let store = open_store(&config.store).await?;
    info!("Audit store ready ({:?} backend)", config.store.backend);

    let rekor = RekorClient::new(config.rekor.url.clone(), config.rekor.timeout())?;
    info!("Transparency log: {}", rekor.base_url());

    let recorder = AuditRecorder::new(Arc::new(rekor), store, config.rekor.search_url.clone());
    let app = api::router(AppState { recorder });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
