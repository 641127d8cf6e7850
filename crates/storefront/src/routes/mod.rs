//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                               - Liveness check
//! GET    /health/ready                         - Readiness check (database)
//!
//! # Catalog
//! GET    /api/products                         - Product listing (?category&min_rating&sort)
//! GET    /api/products/{id}                    - Product detail with reviews
//! POST   /api/products/{id}/reviews            - Submit a review
//! GET    /api/categories                       - Category list
//!
//! # Cart (session)
//! GET    /api/cart                             - Current cart with totals
//! POST   /api/cart/items                       - Add one unit at a tier
//! PATCH  /api/cart/items                       - Change a line's quantity
//! DELETE /api/cart/items                       - Remove a line
//! DELETE /api/cart                             - Empty the cart
//! POST   /api/checkout                         - Place an order from the cart
//!
//! # Orders
//! POST   /api/orders                           - Place an order
//! GET    /api/orders/{id}                      - Order with items
//! GET    /api/orders/{id}/tracking             - Status and progress steps
//! GET    /api/orders/{id}/payment-instructions - How to pay
//!
//! # Support
//! POST   /api/contact                          - Queue a contact message
//! POST   /api/support/chat                     - Ask the support assistant
//! ```

pub mod cart;
pub mod contact;
pub mod orders;
pub mod products;
pub mod support;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use harbor_core::parse_path_id;

use crate::error::AppError;
use crate::middleware::{api_rate_limiter, rate_limited_as_json, write_rate_limiter};
use crate::state::AppState;

// =============================================================================
// Extractors
// =============================================================================

/// JSON body extractor whose rejections use the API error payload.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

/// Query string extractor whose rejections use the API error payload.
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Parse a numeric path segment; anything else is a missing resource.
fn path_id<T: From<i32>>(raw: &str, resource: &'static str) -> Result<T, AppError> {
    parse_path_id(raw).map_err(|_| AppError::NotFound(resource))
}

// =============================================================================
// Shared response bodies
// =============================================================================

/// `{"success": true}`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Self = Self { success: true };
}

// =============================================================================
// Health
// =============================================================================

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

// =============================================================================
// Route groups
// =============================================================================

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Reads and cart edits.
fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::index))
        .route("/api/products/{id}", get(products::show))
        .route("/api/categories", get(products::categories))
        .route("/api/cart", get(cart::show).delete(cart::clear))
        .route(
            "/api/cart/items",
            post(cart::add).patch(cart::update).delete(cart::remove),
        )
        .route("/api/orders/{id}", get(orders::show))
        .route("/api/orders/{id}/tracking", get(orders::tracking))
        .route(
            "/api/orders/{id}/payment-instructions",
            get(orders::payment_instructions),
        )
}

/// Endpoints that store data or call the assistant.
fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products/{id}/reviews", post(products::create_review))
        .route("/api/orders", post(orders::create))
        .route("/api/checkout", post(cart::checkout))
        .route("/api/contact", post(contact::submit))
        .route("/api/support/chat", post(support::chat))
}

/// Create all routes for the storefront, without rate limiting.
pub fn routes() -> Router<AppState> {
    health_routes().merge(read_routes()).merge(write_routes())
}

/// Create all routes for the storefront with per-IP rate limits.
///
/// Needs the server to provide `ConnectInfo<SocketAddr>` unless a proxy sets
/// a client IP header.
pub fn rate_limited_routes() -> Router<AppState> {
    health_routes()
        .merge(read_routes().route_layer(api_rate_limiter()))
        .merge(write_routes().route_layer(write_rate_limiter()))
        .layer(middleware::map_response(rate_limited_as_json))
}
