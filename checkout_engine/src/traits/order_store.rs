use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderId};

/// Durable persistence for orders.
///
/// `insert_order` is the write the whole checkout pivots on: once it returns `Ok`, the financial record exists and
/// post-persistence failures (cart, stock) no longer abort the attempt.
///
/// There is no idempotency key tying a payment's external id to at most one order: every cash-on-delivery payment
/// shares the literal id `"COD"`, so a uniqueness constraint there is not possible. The engine never retries a
/// failed write for exactly this reason; a manual retry can duplicate the order.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Clone {
    /// Write a new order. Returns the stored order, including its assigned row id and creation time.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Fetch an order by its public order id, if it exists.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// All orders placed by the given buyer, oldest first.
    async fn fetch_orders_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, OrderStoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Order {0} already exists")]
    DuplicateOrder(OrderId),
    #[error("Could not encode order for storage: {0}")]
    Encoding(String),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<serde_json::Error> for OrderStoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}
