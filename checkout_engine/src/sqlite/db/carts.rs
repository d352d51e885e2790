use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CartLine, ProductId},
    traits::CartError,
};

/// All cart lines for the buyer, in the order they were added.
pub async fn cart_for_buyer(buyer_id: &str, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, CartError> {
    let lines = sqlx::query_as(
        r#"
            SELECT product_id, product_name, quantity, unit_cost, seller_id, category, subcategory
            FROM cart_items WHERE buyer_id = $1 ORDER BY added_at, product_id
        "#,
    )
    .bind(buyer_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

/// Add a line to the buyer's cart. If the product is already in the cart, the quantities are summed and the
/// snapshot fields are refreshed to the incoming line.
pub async fn add_to_cart(buyer_id: &str, line: CartLine, conn: &mut SqliteConnection) -> Result<(), CartError> {
    sqlx::query(
        r#"
            INSERT INTO cart_items (buyer_id, product_id, product_name, quantity, unit_cost, seller_id, category, subcategory)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (buyer_id, product_id) DO UPDATE SET
                quantity = quantity + excluded.quantity,
                product_name = excluded.product_name,
                unit_cost = excluded.unit_cost,
                seller_id = excluded.seller_id,
                category = excluded.category,
                subcategory = excluded.subcategory
        "#,
    )
    .bind(buyer_id)
    .bind(line.product_id.as_str())
    .bind(&line.product_name)
    .bind(line.quantity)
    .bind(line.unit_cost.value())
    .bind(&line.seller_id)
    .bind(&line.category)
    .bind(&line.subcategory)
    .execute(conn)
    .await?;
    Ok(())
}

/// Remove one product's line from the buyer's cart. Removing a product that is not in the cart is a no-op.
pub async fn remove_product(
    buyer_id: &str,
    product_id: &ProductId,
    conn: &mut SqliteConnection,
) -> Result<(), CartError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE buyer_id = $1 AND product_id = $2")
        .bind(buyer_id)
        .bind(product_id.as_str())
        .execute(conn)
        .await?;
    trace!("🧺️ Removed {} line(s) for product {product_id} from {buyer_id}'s cart", result.rows_affected());
    Ok(())
}

/// Empty the buyer's cart.
pub async fn clear_cart(buyer_id: &str, conn: &mut SqliteConnection) -> Result<(), CartError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE buyer_id = $1").bind(buyer_id).execute(conn).await?;
    trace!("🧺️ Cleared {} line(s) from {buyer_id}'s cart", result.rows_affected());
    Ok(())
}
