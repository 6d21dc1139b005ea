//! # Quiz Funnel HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /api/submit` - Store a completed quiz and return its stage
//! - `POST /api/generate-result` - Personalized result (model or fallback)
//! - `POST /api/booking` - Store a consultation request
//! - `GET /api/stats` - Aggregate statistics (admin)
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `QUIZFUNNEL_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `QUIZFUNNEL_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `QUIZFUNNEL_API_KEY`: If set, `/api/stats` requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `quizfunnel::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    booking_handler, generate_handler, health_handler, stats_handler, submit_handler,
};
#[allow(unused_imports)]
pub use types::{
    BookingRequest, BookingResponse, ErrorResponse, GenerateRequest, GenerateResponse,
    HealthResponse, ResultSource, SubmitRequest, SubmitResponse, SubmittedData,
};

use crate::generator::ResultGenerator;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use quizfunnel_core::{FallbackRenderer, QuizError, Storage};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum accepted request body (256 KB).
const MAX_BODY_BYTES: usize = 256 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// Response and booking store.
    pub storage: Arc<RwLock<Storage>>,
    /// Completion service; `None` means every result is fallback.
    pub generator: Option<Arc<dyn ResultGenerator>>,
    /// Static result renderer.
    pub renderer: FallbackRenderer,
}

impl AppState {
    /// State with the given storage, no generator and the default template.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(RwLock::new(storage)),
            generator: None,
            renderer: FallbackRenderer::default(),
        }
    }

    #[must_use]
    pub fn with_generator(mut self, generator: Option<Arc<dyn ResultGenerator>>) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: FallbackRenderer) -> Self {
        self.renderer = renderer;
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `QUIZFUNNEL_CORS_ORIGINS`.
///
/// - `*`: allows all origins
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("QUIZFUNNEL_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (QUIZFUNNEL_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", s);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in QUIZFUNNEL_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No QUIZFUNNEL_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Restrictive CORS layer for local development front-ends.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication on admin routes (if configured)
pub fn create_router(state: AppState) -> Router {
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    if get_api_key_from_env().is_some() {
        tracing::info!("API key authentication enabled for admin endpoints");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - /api/stats is publicly accessible! \
             Set QUIZFUNNEL_API_KEY to protect it."
        );
    }

    let admin = Router::new()
        .route("/api/stats", get(handlers::stats_handler))
        .route_layer(axum_middleware::from_fn(auth::api_key_auth_middleware));

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/submit", post(handlers::submit_handler))
        .route("/api/generate-result", post(handlers::generate_handler))
        .route("/api/booking", post(handlers::booking_handler))
        .merge(admin);

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind `addr` and serve until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), QuizError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| QuizError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Quiz funnel HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| QuizError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
