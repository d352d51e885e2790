use std::fmt::Display;

use sce_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderLine, ProductId, ShippingAddress};

//--------------------------------------    BuyerProfile     ---------------------------------------------------------
/// The buyer on whose behalf a checkout attempt runs. Authentication is a collaborator's concern; the engine only
/// needs the id and a shipping snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub buyer_id: String,
    pub shipping: ShippingAddress,
}

impl BuyerProfile {
    pub fn new(buyer_id: &str, shipping: ShippingAddress) -> Self {
        Self { buyer_id: buyer_id.to_string(), shipping }
    }
}

//--------------------------------------   PurchaseContext   ---------------------------------------------------------
/// What is being purchased: one product out of the cart, or the whole cart. Both produce the same intent shape, so
/// everything downstream of the resolver is context-agnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseContext {
    SingleProduct(ProductId),
    FullCart,
}

impl Display for PurchaseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurchaseContext::SingleProduct(id) => write!(f, "single product {id}"),
            PurchaseContext::FullCart => write!(f, "full cart"),
        }
    }
}

//--------------------------------------     OrderIntent     ---------------------------------------------------------
/// A validated, frozen description of what the buyer is about to purchase, built per checkout attempt and consumed
/// by the coordinator. The totals are always recomputed from the lines; upstream totals are never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub buyer_id: String,
    pub shipping: ShippingAddress,
    pub lines: Vec<OrderLine>,
    pub total_quantity: i64,
    pub total_price: Money,
}

impl Display for OrderIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} line(s), {} item(s), {} for buyer {}",
            self.lines.len(),
            self.total_quantity,
            self.total_price,
            self.buyer_id
        )
    }
}

//--------------------------------------   CheckoutWarning   ---------------------------------------------------------
/// A non-fatal problem detected after the order was durably written. The order stands; the warning is surfaced so
/// that the condition can be repaired out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutWarning {
    /// The purchased entries could not be removed from the buyer's cart.
    CartClear { reason: String },
    /// Stock adjustment for a line failed for an infrastructure reason.
    StockAdjust { product_id: ProductId, reason: String },
    /// The conditional decrement lost a race: the product no longer has enough stock to cover the ordered
    /// quantity. Distinct from `StockAdjust` so it can be triaged as oversell rather than as a fault.
    StockConflict { product_id: ProductId, requested: i64 },
}

impl Display for CheckoutWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutWarning::CartClear { reason } => write!(f, "cart was not cleared: {reason}"),
            CheckoutWarning::StockAdjust { product_id, reason } => {
                write!(f, "stock for {product_id} was not adjusted: {reason}")
            },
            CheckoutWarning::StockConflict { product_id, requested } => {
                write!(f, "stock conflict on {product_id}: {requested} unit(s) ordered but not in stock")
            },
        }
    }
}

//--------------------------------------   CheckoutOutcome   ---------------------------------------------------------
/// The terminal result of a successful checkout attempt. The caller decides navigation from this value; there is
/// no global status to poll.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// The persisted order.
    pub order: Order,
    /// Non-fatal post-persistence problems, in the order they were detected.
    pub warnings: Vec<CheckoutWarning>,
}

impl CheckoutOutcome {
    /// True when the order was written *and* the cart and stock reconciliation both completed cleanly.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
