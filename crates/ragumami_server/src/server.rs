//! Server assembly and lifecycle.

use crate::{AppConfig, AppState, create_router};
use ragumami_error::{RagumamiResult, ServerError, ServerErrorKind};
use ragumami_interface::WarehouseMetadata;
use ragumami_models::OllamaClient;
use ragumami_rag::RagOrchestrator;
use ragumami_schema::{BigQueryMetadataClient, FallbackSource, SchemaContextProvider};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, instrument, warn};

/// Build the generation client, schema provider and orchestrator.
///
/// A warehouse that cannot be set up is logged and replaced by the static
/// schema; the generation client must build.
#[instrument(skip(config), fields(model = %config.ollama().model()))]
pub fn build_orchestrator(config: &AppConfig) -> RagumamiResult<RagOrchestrator> {
    let client = OllamaClient::new(config.ollama().clone())?;

    let warehouse: Option<Arc<dyn WarehouseMetadata>> = if config.warehouse_configured() {
        match BigQueryMetadataClient::new(config.bigquery().clone()) {
            Ok(warehouse) => {
                info!(
                    project = %config.bigquery().project_id(),
                    dataset = %config.bigquery().dataset(),
                    "Using live BigQuery schema"
                );
                Some(Arc::new(warehouse))
            }
            Err(e) => {
                warn!(error = %e, "BigQuery client unavailable, using static schema");
                None
            }
        }
    } else {
        info!("BigQuery not configured, using static schema");
        None
    };

    let mut schema = SchemaContextProvider::from_optional(warehouse);
    if let Some(template) = config.schema().fallback_template() {
        schema = schema.with_fallback(FallbackSource::with_template(template.clone())?);
    }

    Ok(RagOrchestrator::new(Arc::new(client), schema))
}

/// Bind, serve until `shutdown` resolves, then drain connections.
pub async fn run<F>(config: AppConfig, shutdown: F) -> RagumamiResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let orchestrator = build_orchestrator(&config)?;
    let schema_source = orchestrator.schema().preferred_source();
    let app = create_router(AppState::new(orchestrator), config.server().cors_origins())?;

    let address = config.server().address();
    let listener = TcpListener::bind(&address).await.map_err(|e| {
        ServerError::new(ServerErrorKind::Bind {
            address: address.clone(),
            reason: e.to_string(),
        })
    })?;

    info!(
        address = %address,
        ollama = %config.ollama().base_url(),
        model = %config.ollama().model(),
        schema = %schema_source,
        "🍜 Jamph-Rag-Api-Umami API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
