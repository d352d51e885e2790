use crate::{checkout_api::errors::FailureKind, db_types::Order};

/// Emitted once per completed checkout, after the stock-adjustment attempt finishes. The order it carries is the
/// persisted record; subscribers typically navigate the buyer to the confirmation view or kick off fulfilment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlacedEvent {
    pub order: Order,
}

impl OrderPlacedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted once per failed checkout attempt. `kind` distinguishes a business rejection from an infrastructure
/// fault so the subscriber can choose the right user-visible message.
#[derive(Debug, Clone)]
pub struct CheckoutFailedEvent {
    pub kind: FailureKind,
    pub reason: String,
}

impl CheckoutFailedEvent {
    pub fn new(kind: FailureKind, reason: String) -> Self {
        Self { kind, reason }
    }
}
