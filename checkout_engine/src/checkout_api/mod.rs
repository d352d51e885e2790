//! # Checkout engine public API
//!
//! The `checkout_api` module exposes the programmatic API of the checkout engine.
//!
//! * [`resolver`] builds a frozen [`OrderIntent`](checkout_objects::OrderIntent) from the buyer's cart: the
//!   validated description of what is about to be purchased, before any payment happens.
//! * [`authorization`] obtains a payment result for an intent, polymorphic over the two payment strategies
//!   (gateway redirect and cash-on-delivery).
//! * [`checkout_flow_api`] is the coordinator: it runs a checkout attempt end to end (intent → payment → persist
//!   order → clear cart → adjust stock) and owns the partial-failure policy.
//!
//! # API usage
//!
//! An API instance is created by supplying a backend that implements the traits in [`crate::traits`]:
//!
//! ```rust,ignore
//! use checkout_engine::{CheckoutFlowApi, PaymentAuthorizer, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(url, 5).await?;
//! let authorizer = PaymentAuthorizer::new(gateway_client, gateway_config, "USD");
//! let api = CheckoutFlowApi::new(db, producers);
//! let outcome = api.checkout(&buyer, PurchaseContext::FullCart, PaymentMethod::CashOnDelivery, &authorizer).await?;
//! ```

pub mod authorization;
pub mod checkout_flow_api;
pub mod checkout_objects;
pub mod errors;
pub mod resolver;
