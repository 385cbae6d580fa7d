//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, FileStore, OpenAiRoadmapAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::Router;
use roadmap_core::ports::{KeyValueStore, RoadmapGenerationService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Select the Roadmap Store ---
    let store: Arc<dyn KeyValueStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            info!("Storing roadmaps under {}", config.store_path.display());
            Arc::new(FileStore::new(config.store_path.clone()))
        }
    };

    // --- 3. Initialize the Generation Adapter ---
    let generator: Option<Arc<dyn RoadmapGenerationService>> =
        match config.require_openai_api_key() {
            Ok(api_key) => {
                let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
                Some(Arc::new(OpenAiRoadmapAdapter::new(
                    openai_client,
                    config.roadmap_model.clone(),
                    config.roadmap_temperature,
                    config.roadmap_max_tokens,
                )))
            }
            Err(e) => {
                warn!("{}; roadmap generation is disabled", e);
                None
            }
        };

    // --- 4. Build the Shared AppState and Router ---
    let app_state = Arc::new(AppState {
        store,
        config: config.clone(),
        generator,
    });

    let app = Router::new()
        .merge(build_router(app_state)?)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
