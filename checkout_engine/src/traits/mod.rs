//! # Backend and collaborator contracts.
//!
//! This module defines the interface contracts the checkout engine needs from its collaborators. The engine API is
//! generic over these traits, so any durable store (or an in-memory fake in tests) can back it.
//!
//! * [`OrderStore`] is durable persistence for orders. Orders are written exactly once per successful checkout.
//! * [`InventoryAdjuster`] decrements stock per ordered line, with an atomic conditional decrement so that stock
//!   never goes negative under concurrent checkouts.
//! * [`CartStore`] reads a buyer's cart and removes purchased entries after an order is durably written.
//! * [`GatewayClient`] and [`GatewayConfigProvider`] are the seams to the online payment gateway: the former drives
//!   the create-order/approval/capture exchange, the latter supplies the per-session client id.
mod cart;
mod gateway;
mod inventory;
mod order_store;

pub use cart::{CartError, CartStore};
pub use gateway::{Approval, GatewayClient, GatewayConfigError, GatewayConfigProvider, GatewayError};
pub use inventory::{InventoryAdjuster, InventoryError};
pub use order_store::{OrderStore, OrderStoreError};
