//! HTTP API Layer
//!
//! This crate exposes the invoice draft engine over HTTP using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Health check and draft preview
//! - **Middleware**: Request logging and tracing
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! The API is stateless: a preview request carries every edit, and the
//! resulting draft is discarded once the response is written.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::{Clock, SystemClock};

use crate::config::ApiConfig;
use crate::handlers::{drafts, health};
use crate::middleware::request_logging_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates state backed by the system clock
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Creates the main API router
pub fn create_router(config: ApiConfig) -> Router {
    router_with_state(AppState::new(config))
}

/// Creates the router around an explicit state
pub fn router_with_state(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(health::health_check));

    let draft_routes = Router::new().route("/preview", post(drafts::preview_draft));

    let api_routes = Router::new()
        .nest("/invoice-drafts", draft_routes)
        .layer(axum_middleware::from_fn(request_logging_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
