//! An in-memory backend with failure injection, for exercising the coordinator's partial-failure policy without a
//! database.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;

use crate::{
    db_types::{CartLine, NewOrder, Order, OrderId, ProductId},
    traits::{CartError, CartStore, InventoryAdjuster, InventoryError, OrderStore, OrderStoreError},
};

#[derive(Default)]
struct Inner {
    orders: Vec<Order>,
    carts: HashMap<String, Vec<CartLine>>,
    stock: HashMap<ProductId, i64>,
    fail_order_writes: bool,
    fail_cart_mutations: bool,
    fail_stock_adjustments: bool,
}

/// Shared-state fake implementing every backend trait. All clones see the same state.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cart(self, buyer_id: &str, lines: Vec<CartLine>) -> Self {
        self.inner.lock().unwrap().carts.insert(buyer_id.to_string(), lines);
        self
    }

    pub fn with_stock(self, product_id: &str, level: i64) -> Self {
        self.inner.lock().unwrap().stock.insert(ProductId::from(product_id), level);
        self
    }

    pub fn fail_order_writes(self) -> Self {
        self.inner.lock().unwrap().fail_order_writes = true;
        self
    }

    pub fn fail_cart_mutations(self) -> Self {
        self.inner.lock().unwrap().fail_cart_mutations = true;
        self
    }

    pub fn fail_stock_adjustments(self) -> Self {
        self.inner.lock().unwrap().fail_stock_adjustments = true;
        self
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }

    pub fn cart_lines(&self, buyer_id: &str) -> Vec<CartLine> {
        self.inner.lock().unwrap().carts.get(buyer_id).cloned().unwrap_or_default()
    }

    pub fn stock(&self, product_id: &str) -> Option<i64> {
        self.inner.lock().unwrap().stock.get(&ProductId::from(product_id)).copied()
    }
}

impl OrderStore for MemoryBackend {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_order_writes {
            return Err(OrderStoreError::Database("injected order write failure".to_string()));
        }
        if inner.orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(OrderStoreError::DuplicateOrder(order.order_id));
        }
        let stored = Order {
            id: inner.orders.len() as i64 + 1,
            order_id: order.order_id,
            buyer_id: order.buyer_id,
            shipping: order.shipping,
            lines: order.lines,
            payment: order.payment,
            total_quantity: order.total_quantity,
            total_price: order.total_price,
            created_at: Utc::now(),
        };
        inner.orders.push(stored.clone());
        Ok(stored)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.orders.iter().find(|o| &o.order_id == order_id).cloned())
    }

    async fn fetch_orders_for_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, OrderStoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.orders.iter().filter(|o| o.buyer_id == buyer_id).cloned().collect())
    }
}

impl CartStore for MemoryBackend {
    async fn cart_for_buyer(&self, buyer_id: &str) -> Result<Vec<CartLine>, CartError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.carts.get(buyer_id).cloned().unwrap_or_default())
    }

    async fn add_to_cart(&self, buyer_id: &str, line: CartLine) -> Result<(), CartError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_cart_mutations {
            return Err(CartError::Database("injected cart failure".to_string()));
        }
        let cart = inner.carts.entry(buyer_id.to_string()).or_default();
        match cart.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => existing.quantity += line.quantity,
            None => cart.push(line),
        }
        Ok(())
    }

    async fn remove_product(&self, buyer_id: &str, product_id: &ProductId) -> Result<(), CartError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_cart_mutations {
            return Err(CartError::Database("injected cart failure".to_string()));
        }
        if let Some(cart) = inner.carts.get_mut(buyer_id) {
            cart.retain(|l| &l.product_id != product_id);
        }
        Ok(())
    }

    async fn clear_cart(&self, buyer_id: &str) -> Result<(), CartError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_cart_mutations {
            return Err(CartError::Database("injected cart failure".to_string()));
        }
        inner.carts.remove(buyer_id);
        Ok(())
    }
}

impl InventoryAdjuster for MemoryBackend {
    async fn decrement_stock(&self, product_id: &ProductId, quantity: i64) -> Result<(), InventoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_stock_adjustments {
            return Err(InventoryError::Database("injected stock failure".to_string()));
        }
        match inner.stock.get_mut(product_id) {
            None => Err(InventoryError::ProductNotFound(product_id.clone())),
            Some(level) if *level < quantity => {
                Err(InventoryError::InsufficientStock { product_id: product_id.clone(), requested: quantity })
            },
            Some(level) => {
                *level -= quantity;
                Ok(())
            },
        }
    }

    async fn stock_level(&self, product_id: &ProductId) -> Result<Option<i64>, InventoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.stock.get(product_id).copied())
    }
}
