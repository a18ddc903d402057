use axum::{
    extract::{Path, State},
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::aggregator::HolderAggregator;
use crate::config::CorsConfig;
use crate::error::AppResult;
use crate::models::{DistributionConfig, ExportMode};

// App state shared by every request; aggregation state itself is per request
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<HolderAggregator>,
    pub distribution: Arc<DistributionConfig>,
    /// Cancelled on shutdown, each request works on a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        aggregator: HolderAggregator,
        distribution: DistributionConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            distribution: Arc::new(distribution),
            shutdown,
        }
    }
}

// Create the main router with all endpoints
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(hello_world))
        .route("/health", get(health_check))
        .route("/holders/{mint_address}", get(get_holders))
        .route("/holders/{mint_address}/airdrop", get(get_airdrop))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(cors_layer(cors)),
        )
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let allow_origin = if cors.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers([
            ACCEPT,
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(cors.max_age_seconds))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };
    error!("Handler panicked: {}", details);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}

async fn hello_world() -> Json<serde_json::Value> {
    Json(json!({ "message": "Hello World" }))
}

// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_holders(
    Path(mint_address): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    export(&state, &mint_address, ExportMode::Holders).await
}

async fn get_airdrop(
    Path(mint_address): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let mode = ExportMode::Airdrop(state.distribution.as_ref().clone());
    export(&state, &mint_address, mode).await
}

async fn export(state: &AppState, mint_address: &str, mode: ExportMode) -> AppResult<Response> {
    info!("Exporting {} for mint {}", mode.file_name(), mint_address);

    let cancel = state.shutdown.child_token();
    let body = state
        .aggregator
        .export_csv(mint_address, &mode, &cancel)
        .await
        .inspect_err(|e| error!("Export for mint {} failed: {}", mint_address, e))?;

    let headers = [
        (CONTENT_TYPE, "text/csv".to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename={}", mode.file_name()),
        ),
    ];
    Ok((StatusCode::OK, headers, body).into_response())
}
