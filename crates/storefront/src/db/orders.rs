//! Order repository.
//!
//! Orders are only ever inserted here. Status changes come from fulfillment
//! tooling outside this service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use harbor_core::{OrderId, OrderStatus, PaymentMethod, ProductId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem};

#[derive(Debug, FromRow)]
struct OrderRow {
    id: OrderId,
    customer_name: String,
    customer_email: String,
    address: String,
    total: Decimal,
    payment_method: PaymentMethod,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    price: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and all of its items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if an item references a missing
    /// product, or `RepositoryError::Database` if a write fails. Nothing is
    /// written in either case.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders (customer_name, customer_email, address, total, payment_method)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.address)
        .bind(order.total)
        .bind(order.payment_method)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from_insert)?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT id, customer_name, customer_email, address, total,
                   payment_method, status, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT oi.product_id, p.name AS product_name, oi.quantity, oi.price
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Order {
            id: row.id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            address: row.address,
            total: row.total,
            payment_method: row.payment_method,
            status: row.status,
            created_at: row.created_at,
            items: items
                .into_iter()
                .map(|item| OrderItem {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
        }))
    }
}
