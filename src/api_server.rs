//! Plan relay HTTP server
//!
//! Routes:
//! - `GET /`                    health check
//! - `POST /api/plans/generate` generate through the ML backend and save
//! - `GET /api/plans`           saved plans, newest first
//! - `GET /api/plans/:id`       one plan
//! - `DELETE /api/plans/:id`    delete a plan
//!
//! Every error body is `{ "error": ... }`; unmatched routes answer 404.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::client::BackendClient;
use crate::config::ServerConfig;
use crate::model::FarmPlanRecord;
use crate::relay::PlanRelay;
use crate::store::{PlanStore, StoreError};

pub const HEALTH_MESSAGE: &str = "KisanSaathi server is running";

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub relay: PlanRelay,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build the backend client and open the record store named by the config.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        tracing::info!("Initializing ML backend client for {}", config.backend_url);
        let backend = BackendClient::new(&config.backend_url)?;

        let store = match &config.database_url {
            Some(url) => {
                tracing::info!("Connecting to PostgreSQL...");
                PlanStore::connect(url).await?
            }
            None => {
                tracing::warn!("DATABASE_URL not set; plans are kept in memory and lost on restart");
                PlanStore::in_memory()
            }
        };

        Ok(Self::from_parts(config, backend, store))
    }

    pub fn from_parts(config: ServerConfig, backend: BackendClient, store: PlanStore) -> Self {
        Self {
            relay: PlanRelay::new(backend, store),
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &PlanStore {
        self.relay.store()
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let routes = Router::new()
        .route("/", get(health_check).fallback(route_not_found))
        .route(
            "/api/plans/generate",
            post(generate_plan).fallback(route_not_found),
        )
        .route("/api/plans", get(list_plans).fallback(route_not_found))
        .route(
            "/api/plans/:id",
            get(get_plan).delete(delete_plan).fallback(route_not_found),
        )
        .fallback(route_not_found)
        .with_state(state);

    with_middleware(routes, config)
}

/// Wrap routes in the server's middleware stack: panic capture,
/// compression, CORS, origin enforcement and request tracing.
pub fn with_middleware(routes: Router, config: Arc<ServerConfig>) -> Router {
    let development = config.mode.is_development();

    // Middleware (applied in reverse order)
    routes
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(panic, development)
        }))
        .layer(CompressionLayer::new())
        .layer(cors_layer(config.clone()))
        .layer(middleware::from_fn_with_state(config, enforce_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: Arc<ServerConfig>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin_allowed(&config, origin)
        }))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn origin_allowed(config: &ServerConfig, origin: &HeaderValue) -> bool {
    origin
        .to_str()
        .map(|o| config.origin_allowed(o))
        .unwrap_or(false)
}

/// Refuse browser requests from origins outside the allow-list. Requests
/// without an `Origin` header always pass.
async fn enforce_origin(
    State(config): State<Arc<ServerConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        if !origin_allowed(&config, origin) {
            tracing::warn!("Rejected request from origin {:?}", origin);
            return AppError::Cors.into_response();
        }
    }
    next.run(request).await
}

/// 500 body for a panicking handler; `stack` only in development mode.
pub(crate) fn panic_response(panic: Box<dyn Any + Send + 'static>, development: bool) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("Internal Server Error")
        .to_string();
    tracing::error!("Error: {}", message);

    let mut body = json!({ "error": message });
    if development {
        body["stack"] = json!(std::backtrace::Backtrace::force_capture().to_string());
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": HEALTH_MESSAGE,
    }))
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found")
}

/// POST /api/plans/generate
///
/// Body is forwarded to the backend as-is. A body sent without a JSON
/// content type is treated as `{}`.
async fn generate_plan(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<FarmPlanRecord>, AppError> {
    let request = match payload {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => json!({}),
        Err(rejection) => return Err(AppError::BadRequest(rejection.body_text())),
    };

    let record = state.relay.generate(request).await.map_err(|e| {
        tracing::error!("Error generating plan: {}", e);
        AppError::Relay(e.details())
    })?;

    Ok(Json(record))
}

async fn list_plans(State(state): State<AppState>) -> Result<Json<Vec<FarmPlanRecord>>, AppError> {
    let plans = state.store().list().await.map_err(|e| {
        tracing::error!("Error fetching plans: {}", e);
        AppError::Internal("Failed to fetch plans")
    })?;
    tracing::debug!("Listing {} plans", plans.len());
    Ok(Json(plans))
}

async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FarmPlanRecord>, AppError> {
    // An id that is not a UUID cannot name a record
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("Plan not found"))?;

    match state.store().get(id).await {
        Ok(plan) => Ok(Json(plan)),
        Err(StoreError::NotFound(_)) => Err(AppError::NotFound("Plan not found")),
        Err(e) => {
            tracing::error!("Error fetching plan: {}", e);
            Err(AppError::Internal("Failed to fetch plan"))
        }
    }
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let deleted = match Uuid::parse_str(&id) {
        Ok(id) => state.store().delete(id).await,
        Err(_) => Err(StoreError::NotFound(Uuid::nil())),
    };

    deleted.map_err(|e| {
        tracing::error!("Error deleting plan {}: {}", id, e);
        AppError::Internal("Failed to delete plan")
    })?;

    Ok(Json(json!({ "message": "Plan deleted successfully" })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    /// Unparseable request body
    BadRequest(String),
    NotFound(&'static str),
    Internal(&'static str),
    /// Relay failure, with the underlying error text
    Relay(String),
    /// Origin outside the allow-list
    Cors,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
            AppError::Relay(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to generate farm plan", "details": details }),
            ),
            AppError::Cors => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Not allowed by CORS" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_panic_response_hides_stack_outside_development() {
        let response = panic_response(Box::new("boom"), false);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "boom");
        assert!(body.get("stack").is_none());
    }

    #[tokio::test]
    async fn test_panic_response_includes_stack_in_development() {
        let response = panic_response(Box::new(String::from("kaboom")), true);
        let body = body_json(response).await;
        assert_eq!(body["error"], "kaboom");
        assert!(body["stack"].is_string());
    }

    #[tokio::test]
    async fn test_relay_error_body() {
        let response = AppError::Relay("Request failed with status code 500".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to generate farm plan");
        assert_eq!(body["details"], "Request failed with status code 500");
    }

    #[test]
    fn test_origin_check_rejects_non_utf8() {
        let config = ServerConfig::default();
        let origin = HeaderValue::from_bytes(b"http://\xff").unwrap();
        assert!(!origin_allowed(&config, &origin));
    }
}
