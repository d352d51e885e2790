//! `SqliteDatabase` is a concrete implementation of a checkout engine backend.
//!
//! Unsurprisingly, it uses SQLite, and implements all the backend traits defined in [`crate::traits`].
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{carts, new_pool, orders, products, MIGRATOR};
use crate::{
    db_types::{CartLine, NewOrder, Order, OrderId, Product, ProductId},
    traits::{CartError, CartStore, InventoryAdjuster, InventoryError, OrderStore, OrderStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Connect to the database at `url` with a pool of up to `max_connections` connections.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        debug!("🗃️ Connected to {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    /// A fresh in-memory database with the schema applied. Handy for tests; the single-connection pool keeps
    /// every query on the same in-memory instance.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        let db = Self::new_with_url("sqlite::memory:", 1).await?;
        MIGRATOR.run(&db.pool).await.map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
        Ok(db)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert or replace a catalog row. Used for seeding; catalog management proper lives outside the engine.
    pub async fn upsert_product(&self, product: &Product) -> Result<(), InventoryError> {
        let mut conn = self.pool.acquire().await?;
        products::upsert_product(product, &mut conn).await
    }

    pub async fn fetch_product(&self, product_id: &ProductId) -> Result<Option<Product>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_product(product_id, &mut conn).await
    }
}

impl OrderStore for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn fetch_orders_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_buyer(buyer_id, &mut conn).await
    }
}

impl InventoryAdjuster for SqliteDatabase {
    async fn decrement_stock(&self, product_id: &ProductId, quantity: i64) -> Result<(), InventoryError> {
        let mut conn = self.pool.acquire().await?;
        products::decrement_stock(product_id, quantity, &mut conn).await
    }

    async fn stock_level(&self, product_id: &ProductId) -> Result<Option<i64>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        products::stock_level(product_id, &mut conn).await
    }
}

impl CartStore for SqliteDatabase {
    async fn cart_for_buyer(&self, buyer_id: &str) -> Result<Vec<CartLine>, CartError> {
        let mut conn = self.pool.acquire().await?;
        carts::cart_for_buyer(buyer_id, &mut conn).await
    }

    async fn add_to_cart(&self, buyer_id: &str, line: CartLine) -> Result<(), CartError> {
        let mut conn = self.pool.acquire().await?;
        carts::add_to_cart(buyer_id, line, &mut conn).await
    }

    async fn remove_product(&self, buyer_id: &str, product_id: &ProductId) -> Result<(), CartError> {
        let mut conn = self.pool.acquire().await?;
        carts::remove_product(buyer_id, product_id, &mut conn).await
    }

    async fn clear_cart(&self, buyer_id: &str) -> Result<(), CartError> {
        let mut conn = self.pool.acquire().await?;
        carts::clear_cart(buyer_id, &mut conn).await
    }
}

#[cfg(test)]
mod test {
    use sce_common::Money;

    use super::*;
    use crate::{
        db_types::{OrderLine, PaymentInfo, ShippingAddress},
        helpers,
    };

    fn sample_product(id: &str, stock: i64) -> Product {
        Product {
            id: ProductId::from(id),
            product_name: format!("Product {id}"),
            unit_cost: Money::from_cents(1500),
            discount_percent: 10,
            description: "A fine product".to_string(),
            tagline: String::new(),
            product_image: String::new(),
            category: "garden".to_string(),
            subcategory: "tools".to_string(),
            quantity: stock,
            seller_id: "seller-1".to_string(),
        }
    }

    fn sample_order() -> NewOrder {
        let line = OrderLine {
            product_id: ProductId::from("p1"),
            product_name: "Product p1".to_string(),
            quantity: 2,
            unit_cost: Money::from_cents(1500),
            seller_id: "seller-1".to_string(),
            category: "garden".to_string(),
            subcategory: "tools".to_string(),
        };
        NewOrder {
            order_id: helpers::new_order_id(),
            buyer_id: "buyer-1".to_string(),
            shipping: ShippingAddress { city: "Hue".to_string(), ..Default::default() },
            lines: vec![line],
            payment: PaymentInfo::cash_on_delivery(),
            total_quantity: 2,
            total_price: Money::from_cents(3000),
        }
    }

    #[tokio::test]
    async fn orders_round_trip_with_embedded_copies() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let new_order = sample_order();
        let stored = db.insert_order(new_order.clone()).await.unwrap();
        assert!(new_order.is_equivalent(&stored));
        let fetched = db.fetch_order_by_order_id(&stored.order_id).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn duplicate_order_ids_are_rejected() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let new_order = sample_order();
        db.insert_order(new_order.clone()).await.unwrap();
        let err = db.insert_order(new_order).await.unwrap_err();
        assert!(matches!(err, OrderStoreError::DuplicateOrder(_)));
    }

    #[tokio::test]
    async fn conditional_decrement_never_goes_negative() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        db.upsert_product(&sample_product("p1", 3)).await.unwrap();
        db.decrement_stock(&ProductId::from("p1"), 3).await.unwrap();
        assert_eq!(db.stock_level(&ProductId::from("p1")).await.unwrap(), Some(0));
        let err = db.decrement_stock(&ProductId::from("p1"), 1).await.unwrap_err();
        assert!(matches!(err, InventoryError::InsufficientStock { requested: 1, .. }));
        assert_eq!(db.stock_level(&ProductId::from("p1")).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn decrementing_an_unknown_product_is_its_own_error() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let err = db.decrement_stock(&ProductId::from("ghost"), 1).await.unwrap_err();
        assert!(matches!(err, InventoryError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn adding_the_same_product_twice_sums_quantities() {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let line = CartLine {
            product_id: ProductId::from("p1"),
            product_name: "Product p1".to_string(),
            quantity: 1,
            unit_cost: Money::from_cents(1500),
            seller_id: "seller-1".to_string(),
            category: "garden".to_string(),
            subcategory: "tools".to_string(),
        };
        db.add_to_cart("buyer-1", line.clone()).await.unwrap();
        db.add_to_cart("buyer-1", line).await.unwrap();
        let cart = db.cart_for_buyer("buyer-1").await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 2);
    }
}
