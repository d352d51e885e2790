//! Storefront Checkout Engine
//!
//! The checkout engine turns a buyer's cart (or a single product from it) into a persisted order, taking payment
//! through a third-party online gateway or cash-on-delivery, and reconciles the order against the cart and
//! inventory. This library contains the core logic; it is provider-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Backend contracts and storage ([`mod@traits`], [`mod@sqlite`]). The engine is generic over an
//!    [`OrderStore`], a [`CartStore`] and an [`InventoryAdjuster`]; [`SqliteDatabase`] implements all three. You
//!    should never need to reach into the database directly; use the public API. The data types shared with
//!    storage live in [`db_types`] and are public.
//! 2. The checkout public API ([`mod@checkout_api`]): the cart snapshot resolver, the payment authorization
//!    adapter, and the checkout flow coordinator that owns the partial-failure policy.
//!
//! The engine also provides a set of events that can be subscribed to. When a checkout completes an
//! `OrderPlacedEvent` is emitted, and a failed attempt emits a `CheckoutFailedEvent`; a simple hook framework in
//! [`mod@events`] lets you react to these without touching the checkout pipeline.
mod checkout_api;
mod config;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use checkout_api::{
    authorization::{AuthorizePayment, PaymentAuthorizer},
    checkout_flow_api::{CheckoutFlowApi, CheckoutPhase},
    checkout_objects::{BuyerProfile, CheckoutOutcome, CheckoutWarning, OrderIntent, PurchaseContext},
    errors::{AuthorizationError, CheckoutError, FailureKind, IntentError},
    resolver,
};
pub use config::GatewayConfig;
