//! Cart route handlers.
//!
//! The cart is kept in the visitor's session and priced from the catalog when
//! a line is added. Every cart endpoint answers with the updated cart and its
//! totals.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::{Session, session};
use tracing::instrument;

use harbor_core::{Cart, OrderId, ProductId};

use super::ApiJson;
use crate::db::ProductRepository;
use crate::error::{AppError, add_breadcrumb};
use crate::models::{CartView, session::keys};
use crate::services::orders::{OrderRequest, place_order};
use crate::state::AppState;

// =============================================================================
// Request / response bodies
// =============================================================================

/// Add one unit of a product, optionally at a named tier.
#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_id: ProductId,
    pub tier: Option<String>,
}

/// Change the quantity of the `(product_id, price)` line by `delta`.
#[derive(Debug, Deserialize)]
pub struct UpdateItem {
    pub product_id: ProductId,
    pub price: Decimal,
    pub delta: i64,
}

/// Identify the `(product_id, price)` line to remove.
#[derive(Debug, Deserialize)]
pub struct RemoveItem {
    pub product_id: ProductId,
    pub price: Decimal,
}

/// `{"orderId": ...}`
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: OrderId,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart from the session, empty if there is none.
async fn load_cart(session: &Session) -> Result<Cart, AppError> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Store the cart in the session.
async fn save_cart(session: &Session, cart: &Cart) -> Result<(), AppError> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

fn view(state: &AppState, cart: &Cart) -> Json<CartView> {
    Json(CartView::new(cart, &state.config().shipping))
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the current cart.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartView>, AppError> {
    let cart = load_cart(&session).await?;
    Ok(view(&state, &cart))
}

/// Add one unit of a product at the selected (or default) tier price.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    ApiJson(item): ApiJson<AddItem>,
) -> Result<Json<CartView>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get(item.product_id)
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    let price = product
        .price_options()
        .resolve(item.tier.as_deref())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "unknown pricing tier: {}",
                item.tier.as_deref().unwrap_or_default()
            ))
        })?;

    let mut cart = load_cart(&session).await?;
    cart.add(product.snapshot(), price);
    save_cart(&session, &cart).await?;

    let product_id = product.id.to_string();
    let price = price.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str()), ("price", price.as_str())]),
    );

    Ok(view(&state, &cart))
}

/// Change a line's quantity; the quantity never drops below one.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    ApiJson(item): ApiJson<UpdateItem>,
) -> Result<Json<CartView>, AppError> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(item.product_id, item.price, item.delta)
        .ok_or(AppError::NotFound("Cart item"))?;
    save_cart(&session, &cart).await?;
    Ok(view(&state, &cart))
}

/// Remove a line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    ApiJson(item): ApiJson<RemoveItem>,
) -> Result<Json<CartView>, AppError> {
    let mut cart = load_cart(&session).await?;
    if !cart.remove(item.product_id, item.price) {
        return Err(AppError::NotFound("Cart item"));
    }
    save_cart(&session, &cart).await?;
    Ok(view(&state, &cart))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartView>, AppError> {
    session.remove::<Cart>(keys::CART).await?;
    Ok(view(&state, &Cart::new()))
}

/// Place an order for the session cart and empty it.
///
/// The body carries the customer fields; any `items` in it are replaced by
/// the cart's lines.
#[instrument(skip(state, session, request))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<OrderRequest>,
) -> Result<(StatusCode, Json<OrderCreated>), AppError> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Err(AppError::Validation("cart is empty".to_string()));
    }

    let order_id = place_order(
        state.pool(),
        &state.config().shipping,
        request.with_cart(&cart),
    )
    .await?;

    let cleared = session.remove::<Cart>(keys::CART).await;
    add_breadcrumb("checkout", "Order placed from cart", None);

    Ok(order_placed(order_id, cleared))
}

/// The order is committed at this point, so failing to empty the cart is
/// logged and the order id is still returned.
fn order_placed(
    order_id: OrderId,
    cleared: Result<Option<Cart>, session::Error>,
) -> (StatusCode, Json<OrderCreated>) {
    if let Err(e) = cleared {
        tracing::error!(order_id = %order_id, error = %e, "Failed to clear cart after checkout");
    }
    (StatusCode::CREATED, Json(OrderCreated { order_id }))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use super::*;
    use crate::routes::tests::send;

    #[tokio::test]
    async fn test_new_session_has_empty_cart() {
        let (status, body) = send(Method::GET, "/api/cart", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"], serde_json::json!([]));
        assert_eq!(body["item_count"], 0);
        assert_eq!(body["subtotal"], 0.0);
    }

    #[tokio::test]
    async fn test_update_missing_line_is_not_found() {
        let (status, body) = send(
            Method::PATCH,
            "/api/cart/items",
            Some(r#"{"product_id":1,"price":10,"delta":1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Cart item not found");
    }

    #[tokio::test]
    async fn test_remove_missing_line_is_not_found() {
        let (status, _) = send(
            Method::DELETE,
            "/api/cart/items",
            Some(r#"{"product_id":1,"price":10}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart_is_rejected() {
        let (status, body) = send(
            Method::POST,
            "/api/checkout",
            Some(
                r#"{"customer_name":"Ada","customer_email":"ada@example.com",
                    "address":"1 Quay St","payment_method":"bitcoin"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "cart is empty");
    }

    #[tokio::test]
    async fn test_clear_returns_empty_cart() {
        let (status, body) = send(Method::DELETE, "/api/cart", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item_count"], 0);
    }

    #[test]
    fn test_order_placed_survives_session_failure() {
        let failure = session::Error::Store(tower_sessions::session_store::Error::Backend(
            "store unavailable".to_string(),
        ));
        let (status, Json(body)) = order_placed(OrderId::new(42), Err(failure));
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.order_id, OrderId::new(42));

        let (status, _) = order_placed(OrderId::new(43), Ok(None));
        assert_eq!(status, StatusCode::CREATED);
    }

    #[test]
    fn test_order_created_uses_camel_case() {
        let body = serde_json::to_value(OrderCreated {
            order_id: OrderId::new(7),
        })
        .unwrap_or_default();
        assert_eq!(body, serde_json::json!({ "orderId": 7 }));
    }
}
