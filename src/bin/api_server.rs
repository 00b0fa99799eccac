// src/bin/api_server.rs

use anyhow::Context;
use movies_api::infra::telemetry;
use movies_api::transport;
use movies_api::{
    AppConfig, InMemoryMovieStore, MovieService, MovieStore, PostgresMovieStore, StorageBackend,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    // --- Storage Initialization ---
    let store: Arc<dyn MovieStore> = match &config.storage {
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            info!(max_connections, "Connecting to Postgres");
            let store = PostgresMovieStore::connect(database_url, *max_connections)
                .await
                .context("Failed to connect to the movie database")?;
            Arc::new(store)
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory movie store; data is lost on restart");
            Arc::new(InMemoryMovieStore::new())
        }
    };

    let app_state = transport::http::AppState::new(MovieService::new(store));

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Movies API listening on http://{}", addr);
    info!(
        "Swagger UI available at http://localhost:{}/swagger-ui",
        config.port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
