use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use sce_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------      ProductId      ---------------------------------------------------------
/// A lightweight wrapper around the catalog's product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ProductId(pub String);

impl<S: Into<String>> From<S> for ProductId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       OrderId       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    PaymentMethod    ---------------------------------------------------------
/// How the buyer settles the order. `Gateway` covers the online redirect flow; `CashOnDelivery` is settled at
/// physical delivery, outside the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    Gateway,
    CashOnDelivery,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Gateway => write!(f, "Gateway"),
            PaymentMethod::CashOnDelivery => write!(f, "CashOnDelivery"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid payment method: {0}")]
pub struct ConversionError(String);

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Gateway" => Ok(Self::Gateway),
            "CashOnDelivery" => Ok(Self::CashOnDelivery),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------     PaymentInfo     ---------------------------------------------------------
/// The external id reported for every cash-on-delivery payment.
pub const COD_EXTERNAL_ID: &str = "COD";
/// The status reported for every cash-on-delivery payment.
pub const COD_STATUS: &str = "Paid on Delivery";
/// Gateway capture statuses that count as a settled payment.
pub const GATEWAY_SUCCESS_STATUSES: [&str; 2] = ["COMPLETED", "CAPTURED"];

/// A frozen copy of the payment outcome, embedded in the order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    /// The gateway's capture id, or the literal `"COD"` for cash-on-delivery.
    pub external_id: String,
    /// The raw status string as reported by the gateway, or `"Paid on Delivery"` for COD.
    pub status: String,
}

impl PaymentInfo {
    pub fn cash_on_delivery() -> Self {
        Self {
            method: PaymentMethod::CashOnDelivery,
            external_id: COD_EXTERNAL_ID.to_string(),
            status: COD_STATUS.to_string(),
        }
    }

    pub fn gateway(external_id: String, status: String) -> Self {
        Self { method: PaymentMethod::Gateway, external_id, status }
    }

    /// Whether the status belongs to the recognized success set for the payment method. The coordinator refuses to
    /// persist an order whose payment does not pass this check.
    pub fn is_settled(&self) -> bool {
        match self.method {
            PaymentMethod::Gateway => GATEWAY_SUCCESS_STATUSES.contains(&self.status.as_str()),
            PaymentMethod::CashOnDelivery => self.status == COD_STATUS,
        }
    }
}

impl Display for PaymentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} ({})", self.method, self.external_id, self.status)
    }
}

//--------------------------------------   ShippingAddress   ---------------------------------------------------------
/// A snapshot of the buyer's shipping details, copied into the order at checkout time. Later edits to the buyer's
/// profile never change an existing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pin_code: String,
    pub phone: String,
}

//--------------------------------------      OrderLine      ---------------------------------------------------------
/// One purchased line: a frozen copy of catalog data at checkout time. Never re-read from the catalog, even if
/// prices or seller assignments change later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_cost: Money,
    pub seller_id: String,
    pub category: String,
    pub subcategory: String,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_cost * self.quantity
    }
}

//--------------------------------------      CartLine       ---------------------------------------------------------
/// One entry in a buyer's cart, as stored. Mirrors [`OrderLine`] field-for-field; the resolver freezes cart lines
/// into order lines when building an intent.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_cost: Money,
    pub seller_id: String,
    pub category: String,
    pub subcategory: String,
}

impl From<CartLine> for OrderLine {
    fn from(line: CartLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            unit_cost: line.unit_cost,
            seller_id: line.seller_id,
            category: line.category,
            subcategory: line.subcategory,
        }
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
/// A catalog row. Checkout only snapshots the pricing/seller fields; the descriptive fields exist for the rest of
/// the storefront.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub product_name: String,
    pub unit_cost: Money,
    pub discount_percent: i64,
    pub description: String,
    pub tagline: String,
    pub product_image: String,
    pub category: String,
    pub subcategory: String,
    /// Current stock level.
    pub quantity: i64,
    pub seller_id: String,
}

//--------------------------------------        Order        ---------------------------------------------------------
/// A persisted order. Written exactly once per successful checkout and immutable thereafter; `lines` and `payment`
/// are embedded copies, not references into the catalog or gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub buyer_id: String,
    pub shipping: ShippingAddress,
    pub lines: Vec<OrderLine>,
    pub payment: PaymentInfo,
    pub total_quantity: i64,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
/// A candidate order, ready to be written to the order store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub buyer_id: String,
    pub shipping: ShippingAddress,
    pub lines: Vec<OrderLine>,
    pub payment: PaymentInfo,
    pub total_quantity: i64,
    pub total_price: Money,
}

impl NewOrder {
    pub fn is_equivalent(&self, order: &Order) -> bool {
        self.order_id == order.order_id
            && self.buyer_id == order.buyer_id
            && self.shipping == order.shipping
            && self.lines == order.lines
            && self.payment == order.payment
            && self.total_quantity == order.total_quantity
            && self.total_price == order.total_price
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payment_method_parses_its_display_form_only() {
        assert_eq!("Gateway".parse::<PaymentMethod>().unwrap(), PaymentMethod::Gateway);
        assert_eq!("CashOnDelivery".parse::<PaymentMethod>().unwrap(), PaymentMethod::CashOnDelivery);
        assert!("paypal".parse::<PaymentMethod>().is_err());
    }
}
