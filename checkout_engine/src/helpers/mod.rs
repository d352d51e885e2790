//! Small utility functions shared across the engine.

use crate::db_types::OrderId;

/// Generate a fresh public order id. Ids are random rather than sequential so that they leak nothing about order
/// volume.
pub fn new_order_id() -> OrderId {
    OrderId(format!("ord-{:016x}", rand::random::<u64>()))
}
