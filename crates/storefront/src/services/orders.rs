//! Order placement.
//!
//! The server is authoritative for money: item prices must be prices the
//! product is actually sold at, and the total is recomputed from the items and
//! the shipping policy. A client-supplied total is only checked, never stored.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use harbor_core::{
    Cart, Email, MAX_LINE_QUANTITY, OrderId, PaymentMethod, Product, ProductId, ShippingPolicy,
};

use super::{required, within_limit};
use crate::db::{OrderRepository, ProductRepository};
use crate::error::AppError;
use crate::models::{NewOrder, NewOrderItem};

const MAX_NAME_LEN: usize = 200;
const MAX_ADDRESS_LEN: usize = 1000;

/// Order submission as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub address: Option<String>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    /// The total the client displayed; must match the server's.
    pub total: Option<Decimal>,
}

/// One line of an order submission.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    pub quantity: i64,
    pub price: Decimal,
}

impl OrderRequest {
    /// Replace the items with the lines of a session cart.
    #[must_use]
    pub fn with_cart(mut self, cart: &Cart) -> Self {
        self.items = cart
            .lines()
            .iter()
            .map(|line| OrderItemRequest {
                product_id: line.product.id,
                quantity: i64::from(line.quantity),
                price: line.price,
            })
            .collect();
        self
    }
}

/// An order whose fields are valid but whose prices are not yet checked.
#[derive(Debug, Clone)]
struct OrderDraft {
    customer_name: String,
    customer_email: Email,
    address: String,
    payment_method: PaymentMethod,
    items: Vec<NewOrderItem>,
    claimed_total: Option<Decimal>,
}

impl OrderDraft {
    fn parse(request: OrderRequest) -> Result<Self, AppError> {
        let customer_name = required("customer_name", request.customer_name)?;
        within_limit("customer_name", &customer_name, MAX_NAME_LEN)?;
        let email = required("customer_email", request.customer_email)?;
        let customer_email = Email::parse(&email).map_err(AppError::validation)?;
        let address = required("address", request.address)?;
        within_limit("address", &address, MAX_ADDRESS_LEN)?;
        let payment_method = required("payment_method", request.payment_method)?
            .parse::<PaymentMethod>()
            .map_err(AppError::validation)?;

        if request.items.is_empty() {
            return Err(AppError::Validation("items cannot be empty".to_string()));
        }

        let items = request
            .items
            .into_iter()
            .map(|item| {
                if !(1..=i64::from(MAX_LINE_QUANTITY)).contains(&item.quantity) {
                    return Err(AppError::Validation(format!(
                        "quantity for product {} must be between 1 and {MAX_LINE_QUANTITY}",
                        item.product_id
                    )));
                }
                Ok(NewOrderItem {
                    product_id: item.product_id,
                    quantity: i32::try_from(item.quantity).unwrap_or(i32::MAX),
                    price: item.price,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            customer_name,
            customer_email,
            address,
            payment_method,
            items,
            claimed_total: request.total,
        })
    }

    fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.items.iter().map(|i| i.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Check every item against the catalog and compute the total.
    fn price(
        self,
        products: &HashMap<ProductId, Product>,
        shipping: &ShippingPolicy,
    ) -> Result<NewOrder, AppError> {
        for item in &self.items {
            let product = products.get(&item.product_id).ok_or_else(|| {
                AppError::Validation(format!("unknown product {}", item.product_id))
            })?;
            if !product.price_options().offers(item.price) {
                return Err(AppError::Validation(format!(
                    "price {} is not offered for {}",
                    item.price, product.name
                )));
            }
        }

        let subtotal: Decimal = self
            .items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();
        let totals = shipping.totals(subtotal);

        if let Some(claimed) = self.claimed_total
            && claimed.round_dp(2) != totals.total.round_dp(2)
        {
            return Err(AppError::Validation(format!(
                "total {claimed} does not match order total {}",
                totals.total
            )));
        }

        Ok(NewOrder {
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            address: self.address,
            payment_method: self.payment_method,
            items: self.items,
            total: totals.total,
        })
    }
}

/// Validate, price and persist an order.
///
/// # Errors
///
/// Returns `AppError::Validation` for bad input, unknown products, prices the
/// product is not sold at or a mismatched total, and `AppError::Persistence`
/// if the write fails.
#[instrument(skip(pool, shipping, request), fields(items = request.items.len()))]
pub async fn place_order(
    pool: &PgPool,
    shipping: &ShippingPolicy,
    request: OrderRequest,
) -> Result<OrderId, AppError> {
    let draft = OrderDraft::parse(request)?;
    let products = ProductRepository::new(pool)
        .get_many(&draft.product_ids())
        .await?;
    let order = draft.price(&products, shipping)?;

    let id = OrderRepository::new(pool).create(&order).await?;
    tracing::info!(
        order_id = %id,
        total = %order.total,
        payment_method = %order.payment_method,
        "Order placed"
    );
    Ok(id)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use harbor_core::{Category, PricingTier, RatingSummary};

    use super::*;

    fn catalog() -> HashMap<ProductId, Product> {
        let mut tiered = product(1, dec!(15));
        tiered.pricing_tiers = vec![
            PricingTier::new("1 pack", 1, dec!(15)).unwrap_or_else(|e| panic!("{e}")),
            PricingTier::new("5 packs", 5, dec!(60)).unwrap_or_else(|e| panic!("{e}")),
        ];
        [tiered, product(2, dec!(20))]
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    }

    fn product(id: i32, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price,
            image: None,
            category: Category::Pantry,
            pricing_tiers: Vec::new(),
            rating: RatingSummary::default(),
        }
    }

    fn request(items: Vec<OrderItemRequest>) -> OrderRequest {
        OrderRequest {
            customer_name: Some("Ada Lovelace".to_string()),
            customer_email: Some("Ada@Example.com".to_string()),
            address: Some("1 Quay Street".to_string()),
            payment_method: Some("bitcoin".to_string()),
            items,
            total: None,
        }
    }

    fn item(id: i32, quantity: i64, price: Decimal) -> OrderItemRequest {
        OrderItemRequest {
            product_id: ProductId::new(id),
            quantity,
            price,
        }
    }

    fn priced(request: OrderRequest) -> Result<NewOrder, AppError> {
        OrderDraft::parse(request)?.price(&catalog(), &ShippingPolicy::default())
    }

    #[test]
    fn test_small_order_pays_shipping() {
        let order = priced(request(vec![item(2, 2, dec!(20)), item(1, 1, dec!(10) + dec!(5))]))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(order.total, dec!(70));
        assert_eq!(order.payment_method, PaymentMethod::Bitcoin);
        assert_eq!(order.customer_email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_subtotal_fifty_totals_sixty_five() {
        let mut req = request(vec![item(2, 1, dec!(20)), item(1, 2, dec!(15))]);
        req.total = Some(dec!(65.00));
        let order = priced(req).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(order.total, dec!(65));
    }

    #[test]
    fn test_large_order_ships_free() {
        let order = priced(request(vec![item(1, 2, dec!(60))])).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(order.total, dec!(120));
    }

    #[test]
    fn test_mismatched_total_rejected() {
        let mut req = request(vec![item(2, 1, dec!(20))]);
        req.total = Some(dec!(20));
        assert!(matches!(priced(req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_price_not_offered_rejected() {
        let err = priced(request(vec![item(1, 1, dec!(1))])).err();
        assert!(matches!(err, Some(AppError::Validation(ref m)) if m.contains("not offered")));
    }

    #[test]
    fn test_unknown_product_rejected() {
        let err = priced(request(vec![item(99, 1, dec!(20))])).err();
        assert!(matches!(err, Some(AppError::Validation(ref m)) if m.contains("unknown product 99")));
    }

    #[test]
    fn test_field_validation() {
        assert!(matches!(OrderDraft::parse(request(Vec::new())), Err(AppError::Validation(_))));

        let mut req = request(vec![item(2, 1, dec!(20))]);
        req.customer_name = Some("  ".to_string());
        assert!(OrderDraft::parse(req).is_err());

        let mut req = request(vec![item(2, 1, dec!(20))]);
        req.customer_email = Some("not-an-email".to_string());
        assert!(OrderDraft::parse(req).is_err());

        let mut req = request(vec![item(2, 1, dec!(20))]);
        req.payment_method = Some("card".to_string());
        assert!(OrderDraft::parse(req).is_err());

        assert!(OrderDraft::parse(request(vec![item(2, 0, dec!(20))])).is_err());
    }

    #[test]
    fn test_with_cart_copies_lines() {
        let mut cart = Cart::new();
        let snapshot = catalog()
            .get(&ProductId::new(1))
            .map(Product::snapshot)
            .unwrap_or_else(|| panic!("product 1 missing"));
        cart.add(snapshot.clone(), dec!(60));
        cart.add(snapshot, dec!(60));

        let req = OrderRequest::default().with_cart(&cart);
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items.first().map(|i| i.quantity), Some(2));
    }

    #[test]
    fn test_cart_at_quantity_cap_checks_out() {
        let mut cart = Cart::new();
        let snapshot = catalog()
            .get(&ProductId::new(2))
            .map(Product::snapshot)
            .unwrap_or_else(|| panic!("product 2 missing"));
        cart.add(snapshot, dec!(20));
        cart.update_quantity(ProductId::new(2), dec!(20), 1500);

        let order = priced(request(Vec::new()).with_cart(&cart)).unwrap_or_else(|e| panic!("{e}"));
        let quantity = order.items.first().map(|i| i.quantity);
        assert_eq!(quantity, i32::try_from(MAX_LINE_QUANTITY).ok());
        assert_eq!(order.total, dec!(20) * Decimal::from(MAX_LINE_QUANTITY));

        let over = request(vec![item(2, i64::from(MAX_LINE_QUANTITY) + 1, dec!(20))]);
        assert!(matches!(OrderDraft::parse(over), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_item_accepts_id_alias() {
        let parsed: Result<OrderItemRequest, _> =
            serde_json::from_str(r#"{"id": 3, "quantity": 2, "price": 12.5}"#);
        let parsed = parsed.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(parsed.product_id, ProductId::new(3));
        assert_eq!(parsed.price, dec!(12.5));
    }
}
