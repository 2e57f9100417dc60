//! QBSync API Server
//!
//! Main entry point for the document synchronization service.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qbsync_api::{AppState, create_router};
use qbsync_core::SyncEngine;
use qbsync_db::migration::{Migrator, MigratorTrait};
use qbsync_db::{LedgerRepository, connect};
use qbsync_gateway::{DEFAULT_TIMEOUT, HttpRequestProcessor};
use qbsync_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qbsync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        tenants = config.quickbooks.companies.len(),
        bridge = %config.quickbooks.bridge_url,
        "Configuration loaded"
    );

    // Connect to the ledger database and bring the schema up to date
    let db = connect(&config.database).await?;
    Migrator::up(&db, None).await?;
    info!("Connected to ledger database");

    let processor = HttpRequestProcessor::new(config.quickbooks.bridge_url.clone(), DEFAULT_TIMEOUT)?;
    let engine = SyncEngine::new(
        processor,
        LedgerRepository::new(db),
        config.quickbooks,
        config.catalog,
    );

    // Create router
    let app = create_router(AppState::new(engine));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
