//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use harbor_core::{Email, OrderId, OrderStatus, PaymentMethod, ProductId, StepProgress};

use crate::config::PaymentConfig;

/// A placed order with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub address: String,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One purchased line, priced at purchase time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// A validated order ready to be written.
///
/// `total` has already been computed from the items and shipping policy.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: Email,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<NewOrderItem>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Fulfillment progress for the tracking page.
#[derive(Debug, Clone, Serialize)]
pub struct OrderTracking {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub steps: [StepProgress; 4],
}

impl From<&Order> for OrderTracking {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            status: order.status,
            steps: order.status.progress(),
        }
    }
}

/// What the customer needs to pay for an order off-band.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInstructions {
    pub order_id: OrderId,
    pub reference: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub details: PaymentDetails,
}

/// Destination for the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentDetails {
    BankTransfer {
        sort_code: String,
        account_number: String,
        account_name: String,
    },
    Bitcoin {
        address: String,
    },
    /// The store has not configured this method; details follow by email.
    ByEmail { message: String },
}

impl PaymentInstructions {
    /// Build instructions for `order` from the configured payment details.
    #[must_use]
    pub fn for_order(order: &Order, payment: &PaymentConfig) -> Self {
        let details = match order.payment_method {
            PaymentMethod::BankTransfer => payment.bank.as_ref().map(|bank| {
                PaymentDetails::BankTransfer {
                    sort_code: bank.sort_code.clone(),
                    account_number: bank.account_number.clone(),
                    account_name: bank.account_name.clone(),
                }
            }),
            PaymentMethod::Bitcoin => payment
                .bitcoin_address
                .as_ref()
                .map(|address| PaymentDetails::Bitcoin {
                    address: address.clone(),
                }),
        };

        Self {
            order_id: order.id,
            reference: payment_reference(order.id),
            amount: order.total,
            method: order.payment_method,
            details: details.unwrap_or_else(|| PaymentDetails::ByEmail {
                message: "Payment details will be sent to your email address.".to_string(),
            }),
        }
    }
}

/// Payment reference for an order: `ORDER-` plus the last six digits of its id.
#[must_use]
pub fn payment_reference(id: OrderId) -> String {
    let digits = id.to_string();
    let start = digits.len().saturating_sub(6);
    format!("ORDER-{}", digits.get(start..).unwrap_or(&digits))
}
