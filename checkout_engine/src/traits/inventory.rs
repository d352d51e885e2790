use thiserror::Error;

use crate::db_types::ProductId;

/// Stock adjustment at the product-record boundary.
///
/// The decrement is conditional: it only applies if the resulting stock stays non-negative. Two concurrent
/// checkouts can both pass intent validation, but only one of them can win the last unit; the loser gets
/// [`InventoryError::InsufficientStock`], which the coordinator reports distinctly from a generic adjustment
/// failure.
#[allow(async_fn_in_trait)]
pub trait InventoryAdjuster: Clone {
    /// Atomically decrement the product's stock by `quantity`, failing with `InsufficientStock` if the product
    /// does not have that many units left.
    async fn decrement_stock(&self, product_id: &ProductId, quantity: i64) -> Result<(), InventoryError>;

    /// The current stock level for a product.
    async fn stock_level(&self, product_id: &ProductId) -> Result<Option<i64>, InventoryError>;
}

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("Not enough stock to take {requested} of product {product_id}")]
    InsufficientStock { product_id: ProductId, requested: i64 },
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}
