use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{FromRow, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderLine, PaymentInfo, ShippingAddress},
    traits::OrderStoreError,
};

/// The raw row shape; the JSON columns are decoded into their typed forms by [`TryFrom`].
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub order_id: String,
    pub buyer_id: String,
    pub shipping: String,
    pub lines: String,
    pub payment: String,
    pub total_quantity: i64,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = OrderStoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let shipping: ShippingAddress = serde_json::from_str(&row.shipping)?;
        let lines: Vec<OrderLine> = serde_json::from_str(&row.lines)?;
        let payment: PaymentInfo = serde_json::from_str(&row.payment)?;
        Ok(Order {
            id: row.id,
            order_id: OrderId(row.order_id),
            buyer_id: row.buyer_id,
            shipping,
            lines,
            payment,
            total_quantity: row.total_quantity,
            total_price: row.total_price.into(),
            created_at: row.created_at,
        })
    }
}

/// Inserts a new order using the given connection. Orders are written exactly once; a second write with the same
/// `order_id` fails with [`OrderStoreError::DuplicateOrder`] rather than silently overwriting the record.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    let shipping = serde_json::to_string(&order.shipping)?;
    let lines = serde_json::to_string(&order.lines)?;
    let payment = serde_json::to_string(&order.payment)?;
    let row: OrderRow = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                buyer_id,
                shipping,
                lines,
                payment,
                total_quantity,
                total_price
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.order_id.as_str())
    .bind(&order.buyer_id)
    .bind(shipping)
    .bind(lines)
    .bind(payment)
    .bind(order.total_quantity)
    .bind(order.total_price.value())
    .fetch_one(conn)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => OrderStoreError::DuplicateOrder(order.order_id.clone()),
        _ => OrderStoreError::Database(e.to_string()),
    })?;
    let stored = Order::try_from(row)?;
    debug!("📝️ Order [{}] inserted with id {}", stored.order_id, stored.id);
    Ok(stored)
}

/// Returns the order with the given public order id, if any.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderStoreError> {
    let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    row.map(Order::try_from).transpose()
}

/// All orders for the given buyer, oldest first.
pub async fn fetch_orders_for_buyer(buyer_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, OrderStoreError> {
    let rows: Vec<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at, id")
        .bind(buyer_id)
        .fetch_all(conn)
        .await?;
    rows.into_iter().map(Order::try_from).collect()
}
