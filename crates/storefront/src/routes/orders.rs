//! Order route handlers.
//!
//! Orders are read-only once placed; status changes come from fulfillment,
//! never from this API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use harbor_core::OrderId;

use super::cart::OrderCreated;
use super::{ApiJson, path_id};
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::models::{Order, OrderTracking, PaymentInstructions};
use crate::services::orders::{OrderRequest, place_order};
use crate::state::AppState;

async fn load_order(state: &AppState, raw_id: &str) -> Result<Order, AppError> {
    let id: OrderId = path_id(raw_id, "Order")?;
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Order"))
}

/// Place an order from explicit items.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<OrderRequest>,
) -> Result<(StatusCode, Json<OrderCreated>), AppError> {
    let order_id = place_order(state.pool(), &state.config().shipping, request).await?;
    Ok((StatusCode::CREATED, Json(OrderCreated { order_id })))
}

/// Order with its items.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(load_order(&state, &id).await?))
}

/// Order status and the four progress steps.
#[instrument(skip(state))]
pub async fn tracking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderTracking>, AppError> {
    let order = load_order(&state, &id).await?;
    Ok(Json(OrderTracking::from(&order)))
}

/// Where and how to pay for an order.
#[instrument(skip(state))]
pub async fn payment_instructions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentInstructions>, AppError> {
    let order = load_order(&state, &id).await?;
    Ok(Json(PaymentInstructions::for_order(
        &order,
        &state.config().payment,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use super::*;
    use crate::routes::tests::send;

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let (status, body) = send(Method::POST, "/api/orders", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_empty_items_are_rejected() {
        let (status, body) = send(
            Method::POST,
            "/api/orders",
            Some(
                r#"{"customer_name":"Ada","customer_email":"ada@example.com",
                    "address":"1 Quay St","payment_method":"bank_transfer","items":[]}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_malformed_order_id_is_not_found() {
        for uri in [
            "/api/orders/abc",
            "/api/orders/12abc/tracking",
            "/api/orders/-/payment-instructions",
        ] {
            let (status, body) = send(Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["error"], "Order not found");
        }
    }
}
