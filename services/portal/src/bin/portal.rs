//! services/portal/src/bin/portal.rs

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use chrono::Duration;
use portal_lib::{
    adapters::{HttpGraphQlGateway, LocalAssetStore},
    config::Config,
    error::ServiceError,
    web::{build_router, rest::ApiDoc, session::SessionSigner, state::AppState},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| ServiceError::Internal(format!("HTTP client: {e}")))?;
    let gateway = Arc::new(HttpGraphQlGateway::new(
        client.clone(),
        config.graphql_api_url.clone(),
    ));
    let assets = Arc::new(LocalAssetStore::new(
        client,
        config.graphql_api_url.clone(),
        config.upload_dir.clone(),
        config.api_token.clone(),
    ));
    info!("GraphQL backend at {}", config.graphql_api_url);
    info!("Uploads are written to {}", config.upload_dir.display());

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        gateway,
        assets,
        sessions: SessionSigner::new(
            config.session_secret.as_bytes(),
            Duration::hours(config.session_ttl_hours),
        ),
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ServiceError::Internal(format!("CORS_ORIGIN '{}': {e}", config.cors_origin))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let app = build_router(app_state)
        .layer(cors)
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
