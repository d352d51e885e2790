use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Product, ProductId},
    traits::InventoryError,
};

/// Insert or replace a catalog row.
pub async fn upsert_product(product: &Product, conn: &mut SqliteConnection) -> Result<(), InventoryError> {
    sqlx::query(
        r#"
            INSERT INTO products (
                id, product_name, unit_cost, discount_percent, description, tagline, product_image,
                category, subcategory, quantity, seller_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                product_name = excluded.product_name,
                unit_cost = excluded.unit_cost,
                discount_percent = excluded.discount_percent,
                description = excluded.description,
                tagline = excluded.tagline,
                product_image = excluded.product_image,
                category = excluded.category,
                subcategory = excluded.subcategory,
                quantity = excluded.quantity,
                seller_id = excluded.seller_id,
                updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(product.id.as_str())
    .bind(&product.product_name)
    .bind(product.unit_cost.value())
    .bind(product.discount_percent)
    .bind(&product.description)
    .bind(&product.tagline)
    .bind(&product.product_image)
    .bind(&product.category)
    .bind(&product.subcategory)
    .bind(product.quantity)
    .bind(&product.seller_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_product(product_id: &ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, InventoryError> {
    let product = sqlx::query_as(
        r#"
            SELECT id, product_name, unit_cost, discount_percent, description, tagline, product_image,
                   category, subcategory, quantity, seller_id
            FROM products WHERE id = $1
        "#,
    )
    .bind(product_id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(product)
}

pub async fn stock_level(product_id: &ProductId, conn: &mut SqliteConnection) -> Result<Option<i64>, InventoryError> {
    let level: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1")
        .bind(product_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(level)
}

/// Conditionally decrement the product's stock. The `quantity >= $1` guard makes the decrement atomic: under
/// concurrent checkouts only one attempt can take the last units, and the loser sees `InsufficientStock` instead
/// of driving the stock negative.
pub async fn decrement_stock(
    product_id: &ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), InventoryError> {
    let result = sqlx::query(
        "UPDATE products SET quantity = quantity - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND quantity >= $1",
    )
    .bind(quantity)
    .bind(product_id.as_str())
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        // Either the product is gone or there was not enough stock; tell the caller which.
        return match stock_level(product_id, conn).await? {
            None => Err(InventoryError::ProductNotFound(product_id.clone())),
            Some(level) => {
                debug!("📦️ Conditional decrement on {product_id} lost: {level} left, {quantity} requested");
                Err(InventoryError::InsufficientStock { product_id: product_id.clone(), requested: quantity })
            },
        };
    }
    trace!("📦️ Stock for {product_id} decremented by {quantity}");
    Ok(())
}
