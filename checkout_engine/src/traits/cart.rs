use thiserror::Error;

use crate::db_types::{CartLine, ProductId};

/// Read and mutate a buyer's cart.
///
/// The mutators are only ever invoked *after* an order has been durably written: one call to `remove_product` for a
/// single-product purchase, or one call to `clear_cart` for a full-cart purchase. The cart is never touched before
/// the order exists.
#[allow(async_fn_in_trait)]
pub trait CartStore: Clone {
    /// All of the buyer's cart lines, in insertion order.
    async fn cart_for_buyer(&self, buyer_id: &str) -> Result<Vec<CartLine>, CartError>;

    /// Add a line to the buyer's cart, summing quantities if the product is already present.
    async fn add_to_cart(&self, buyer_id: &str, line: CartLine) -> Result<(), CartError>;

    /// Remove a single product's line from the buyer's cart.
    async fn remove_product(&self, buyer_id: &str, product_id: &ProductId) -> Result<(), CartError>;

    /// Remove every line from the buyer's cart.
    async fn clear_cart(&self, buyer_id: &str) -> Result<(), CartError>;
}

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}
