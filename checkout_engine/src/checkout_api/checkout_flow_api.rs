use std::fmt::{Debug, Display};

use log::*;

use crate::{
    checkout_api::{
        authorization::AuthorizePayment,
        checkout_objects::{BuyerProfile, CheckoutOutcome, CheckoutWarning, OrderIntent, PurchaseContext},
        errors::{CheckoutError, FailureKind},
        resolver,
    },
    db_types::{NewOrder, Order, PaymentInfo, PaymentMethod},
    events::{CheckoutFailedEvent, EventProducers, OrderPlacedEvent},
    helpers,
    traits::{CartStore, InventoryAdjuster, InventoryError, OrderStore},
};

/// The phases of a checkout attempt, in pipeline order. `Failed` is reachable from any non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    AwaitingPayment,
    Persisting,
    ClearingCart,
    AdjustingStock,
    Completed,
    Failed,
}

impl Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutPhase::Idle => write!(f, "Idle"),
            CheckoutPhase::AwaitingPayment => write!(f, "AwaitingPayment"),
            CheckoutPhase::Persisting => write!(f, "Persisting"),
            CheckoutPhase::ClearingCart => write!(f, "ClearingCart"),
            CheckoutPhase::AdjustingStock => write!(f, "AdjustingStock"),
            CheckoutPhase::Completed => write!(f, "Completed"),
            CheckoutPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// `CheckoutFlowApi` is the order-reconciliation coordinator: it runs one checkout attempt as a sequential
/// pipeline (resolve intent, obtain payment, persist the order, clear the cart, adjust stock) and owns the
/// partial-failure policy.
///
/// The policy, in one place:
/// * Before the order write, every failure aborts cleanly. Nothing durable has happened; the buyer can retry.
/// * A failed order write *after* a captured payment is terminal and loud ([`CheckoutError::OrderWrite`]). It is
///   never retried here, because a blind retry can duplicate the order.
/// * After the order write, nothing rolls it back. Cart and stock problems are logged and carried as warnings in
///   the [`CheckoutOutcome`]; correctness of the financial record outranks cart tidiness.
pub struct CheckoutFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for CheckoutFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutFlowApi")
    }
}

impl<B> CheckoutFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> CheckoutFlowApi<B>
where B: OrderStore + CartStore + InventoryAdjuster
{
    /// Run one checkout attempt end to end.
    ///
    /// The attempt suspends exactly once, inside `authorizer` while the gateway waits for buyer approval. A
    /// cancellation there returns [`CheckoutError::Cancelled`] with no side effects at all. Every other failure
    /// is reported with a distinguishable reason; no step is ever retried automatically.
    pub async fn checkout<A: AuthorizePayment>(
        &self,
        buyer: &BuyerProfile,
        context: PurchaseContext,
        method: PaymentMethod,
        authorizer: &A,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let result = self.run_pipeline(buyer, &context, method, authorizer).await;
        match &result {
            Ok(outcome) => self.call_order_placed_hook(&outcome.order).await,
            Err(e) => self.call_checkout_failed_hook(e).await,
        }
        result
    }

    async fn run_pipeline<A: AuthorizePayment>(
        &self,
        buyer: &BuyerProfile,
        context: &PurchaseContext,
        method: PaymentMethod,
        authorizer: &A,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let intent = self.resolve_intent(buyer, context).await?;
        debug!("🛒️ {} -> {}: intent resolved ({intent})", CheckoutPhase::Idle, CheckoutPhase::AwaitingPayment);

        let payment = authorizer.authorize(&intent, method).await?;
        if !payment.is_settled() {
            warn!("🛒️ Payment [{payment}] is not in the recognized success set. Refusing to persist an order.");
            return Err(CheckoutError::UnrecognizedPaymentStatus(payment.status));
        }
        debug!("🛒️ {} -> {}: payment settled [{payment}]", CheckoutPhase::AwaitingPayment, CheckoutPhase::Persisting);

        let order = self.persist_order(intent, payment).await?;
        debug!("🛒️ {} -> {}: order {} written", CheckoutPhase::Persisting, CheckoutPhase::ClearingCart, order.order_id);

        let mut warnings = Vec::new();
        self.clear_purchased_lines(buyer, context, &mut warnings).await;
        debug!("🛒️ {} -> {}", CheckoutPhase::ClearingCart, CheckoutPhase::AdjustingStock);

        self.adjust_stock(&order, &mut warnings).await;
        info!(
            "🛒️ {}: order {} for {} completed with {} warning(s)",
            CheckoutPhase::Completed,
            order.order_id,
            order.total_price,
            warnings.len()
        );
        Ok(CheckoutOutcome { order, warnings })
    }

    async fn resolve_intent(
        &self,
        buyer: &BuyerProfile,
        context: &PurchaseContext,
    ) -> Result<OrderIntent, CheckoutError> {
        let cart = self.db.cart_for_buyer(&buyer.buyer_id).await.map_err(|e| {
            error!("🛒️ Could not read the cart for buyer {}: {e}", buyer.buyer_id);
            CheckoutError::CartRead(e.to_string())
        })?;
        let intent = resolver::resolve(buyer, &cart, context)?;
        Ok(intent)
    }

    /// The pivot of the attempt: the payment has been captured, so a write failure here is escalated as
    /// "payment received, order recording failed" and is never silently retried.
    async fn persist_order(&self, intent: OrderIntent, payment: PaymentInfo) -> Result<Order, CheckoutError> {
        let new_order = NewOrder {
            order_id: helpers::new_order_id(),
            buyer_id: intent.buyer_id,
            shipping: intent.shipping,
            lines: intent.lines,
            payment,
            total_quantity: intent.total_quantity,
            total_price: intent.total_price,
        };
        self.db.insert_order(new_order).await.map_err(|e| {
            error!("🛒️ {}: payment was captured but the order write failed. {e}", CheckoutPhase::Failed);
            CheckoutError::OrderWrite(e.to_string())
        })
    }

    /// Cart mutation failure is non-fatal: the order already exists and stock must still be adjusted.
    async fn clear_purchased_lines(
        &self,
        buyer: &BuyerProfile,
        context: &PurchaseContext,
        warnings: &mut Vec<CheckoutWarning>,
    ) {
        let result = match context {
            PurchaseContext::SingleProduct(product_id) => self.db.remove_product(&buyer.buyer_id, product_id).await,
            PurchaseContext::FullCart => self.db.clear_cart(&buyer.buyer_id).await,
        };
        if let Err(e) = result {
            warn!("🛒️ Cart for buyer {} was not cleared after the order was written: {e}", buyer.buyer_id);
            warnings.push(CheckoutWarning::CartClear { reason: e.to_string() });
        }
    }

    /// Each line is adjusted independently; one line's failure does not block the others, and no failure rolls
    /// back the order.
    async fn adjust_stock(&self, order: &Order, warnings: &mut Vec<CheckoutWarning>) {
        for line in &order.lines {
            match self.db.decrement_stock(&line.product_id, line.quantity).await {
                Ok(()) => {
                    trace!("🛒️ Stock for {} decremented by {}", line.product_id, line.quantity);
                },
                Err(InventoryError::InsufficientStock { product_id, requested }) => {
                    warn!(
                        "🛒️ Oversell on {product_id}: order {} took {requested} unit(s) that are no longer in stock",
                        order.order_id
                    );
                    warnings.push(CheckoutWarning::StockConflict { product_id, requested });
                },
                Err(e) => {
                    warn!("🛒️ Stock for {} was not adjusted: {e}", line.product_id);
                    warnings.push(CheckoutWarning::StockAdjust { product_id: line.product_id.clone(), reason: e.to_string() });
                },
            }
        }
    }

    async fn call_order_placed_hook(&self, order: &Order) {
        for emitter in &self.producers.order_placed_producer {
            debug!("🛒️ Notifying order placed hook subscribers");
            let event = OrderPlacedEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_checkout_failed_hook(&self, error: &CheckoutError) {
        // A buyer walking away is not a failure anyone needs to hear about.
        if error.kind() == FailureKind::Cancelled {
            return;
        }
        for emitter in &self.producers.checkout_failed_producer {
            debug!("🛒️ Notifying checkout failed hook subscribers");
            let event = CheckoutFailedEvent::new(error.kind(), error.to_string());
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

#[cfg(test)]
mod test {
    use sce_common::Money;

    use super::*;
    use crate::{
        checkout_api::errors::AuthorizationError,
        db_types::{CartLine, ProductId, ShippingAddress},
        test_utils::memory::MemoryBackend,
    };

    /// Scripted authorization outcome, so the coordinator can be tested without a gateway.
    struct ScriptedAuthorizer(Result<PaymentInfo, AuthorizationError>);

    impl AuthorizePayment for ScriptedAuthorizer {
        async fn authorize(
            &self,
            _intent: &OrderIntent,
            _method: PaymentMethod,
        ) -> Result<PaymentInfo, AuthorizationError> {
            self.0.clone()
        }
    }

    fn buyer() -> BuyerProfile {
        BuyerProfile::new("buyer-1", ShippingAddress::default())
    }

    fn line(product_id: &str, quantity: i64, unit_cost: i64) -> CartLine {
        CartLine {
            product_id: ProductId::from(product_id),
            product_name: format!("Product {product_id}"),
            quantity,
            unit_cost: Money::from_cents(unit_cost),
            seller_id: "seller-1".to_string(),
            category: "stationery".to_string(),
            subcategory: "pens".to_string(),
        }
    }

    fn backend() -> MemoryBackend {
        MemoryBackend::new()
            .with_cart("buyer-1", vec![line("p1", 2, 1000), line("p2", 1, 500)])
            .with_stock("p1", 10)
            .with_stock("p2", 10)
    }

    fn api(db: MemoryBackend) -> CheckoutFlowApi<MemoryBackend> {
        CheckoutFlowApi::new(db, EventProducers::default())
    }

    #[tokio::test]
    async fn order_write_failure_after_capture_is_terminal_and_mutates_nothing() {
        let db = backend().fail_order_writes();
        let api = api(db.clone());
        let authorizer = ScriptedAuthorizer(Ok(PaymentInfo::gateway("cap-1".to_string(), "COMPLETED".to_string())));
        let err = api
            .checkout(&buyer(), PurchaseContext::FullCart, PaymentMethod::Gateway, &authorizer)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderWrite(_)));
        assert_eq!(err.kind(), FailureKind::Failed);
        // no cart mutation, no stock adjustment was attempted
        assert_eq!(db.cart_lines("buyer-1").len(), 2);
        assert_eq!(db.stock("p1"), Some(10));
        assert_eq!(db.stock("p2"), Some(10));
    }

    #[tokio::test]
    async fn declined_payment_never_reaches_persistence() {
        let db = backend();
        let api = api(db.clone());
        let authorizer = ScriptedAuthorizer(Err(AuthorizationError::PaymentDeclined("card refused".to_string())));
        let err = api
            .checkout(&buyer(), PurchaseContext::FullCart, PaymentMethod::Gateway, &authorizer)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentDeclined(_)));
        assert_eq!(db.order_count(), 0);
        assert_eq!(db.cart_lines("buyer-1").len(), 2);
    }

    #[tokio::test]
    async fn cancellation_has_no_side_effects() {
        let db = backend();
        let api = api(db.clone());
        let authorizer = ScriptedAuthorizer(Err(AuthorizationError::Cancelled));
        let err = api
            .checkout(&buyer(), PurchaseContext::FullCart, PaymentMethod::Gateway, &authorizer)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Cancelled);
        assert_eq!(db.order_count(), 0);
        assert_eq!(db.cart_lines("buyer-1").len(), 2);
        assert_eq!(db.stock("p1"), Some(10));
    }

    #[tokio::test]
    async fn unrecognized_payment_status_is_refused_before_persistence() {
        let db = backend();
        let api = api(db.clone());
        let authorizer = ScriptedAuthorizer(Ok(PaymentInfo::gateway("cap-1".to_string(), "PENDING".to_string())));
        let err = api
            .checkout(&buyer(), PurchaseContext::FullCart, PaymentMethod::Gateway, &authorizer)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::UnrecognizedPaymentStatus(_)));
        assert_eq!(db.order_count(), 0);
    }

    #[tokio::test]
    async fn cart_clear_failure_is_a_warning_and_stock_still_adjusts() {
        let db = backend().fail_cart_mutations();
        let api = api(db.clone());
        let authorizer = ScriptedAuthorizer(Ok(PaymentInfo::cash_on_delivery()));
        let outcome = api
            .checkout(&buyer(), PurchaseContext::FullCart, PaymentMethod::CashOnDelivery, &authorizer)
            .await
            .unwrap();
        assert!(!outcome.is_clean());
        assert!(matches!(outcome.warnings.as_slice(), [CheckoutWarning::CartClear { .. }]));
        // the order stands and stock was still adjusted
        assert_eq!(db.order_count(), 1);
        assert_eq!(db.stock("p1"), Some(8));
        assert_eq!(db.stock("p2"), Some(9));
    }

    #[tokio::test]
    async fn stock_failure_is_a_warning_and_the_order_stands() {
        let db = backend().fail_stock_adjustments();
        let api = api(db.clone());
        let authorizer = ScriptedAuthorizer(Ok(PaymentInfo::cash_on_delivery()));
        let outcome = api
            .checkout(&buyer(), PurchaseContext::FullCart, PaymentMethod::CashOnDelivery, &authorizer)
            .await
            .unwrap();
        // each line is reported independently; the order and the cart clear are unaffected
        assert_eq!(db.order_count(), 1);
        assert!(matches!(
            outcome.warnings.as_slice(),
            [CheckoutWarning::StockAdjust { .. }, CheckoutWarning::StockAdjust { .. }]
        ));
        assert!(db.cart_lines("buyer-1").is_empty());
        assert_eq!(db.stock("p1"), Some(10));
        assert_eq!(db.stock("p2"), Some(10));
    }

    #[tokio::test]
    async fn stock_conflict_is_reported_but_the_order_stands() {
        let db = MemoryBackend::new()
            .with_cart("buyer-1", vec![line("p1", 2, 1000), line("p2", 1, 500)])
            .with_stock("p1", 1)
            .with_stock("p2", 10);
        let api = api(db.clone());
        let authorizer = ScriptedAuthorizer(Ok(PaymentInfo::cash_on_delivery()));
        let outcome = api
            .checkout(&buyer(), PurchaseContext::FullCart, PaymentMethod::CashOnDelivery, &authorizer)
            .await
            .unwrap();
        assert_eq!(db.order_count(), 1);
        assert!(matches!(
            outcome.warnings.as_slice(),
            [CheckoutWarning::StockConflict { requested: 2, .. }]
        ));
        // the losing line is untouched; the other line still adjusted
        assert_eq!(db.stock("p1"), Some(1));
        assert_eq!(db.stock("p2"), Some(9));
    }

    #[tokio::test]
    async fn single_product_purchase_leaves_the_rest_of_the_cart() {
        let db = backend();
        let api = api(db.clone());
        let authorizer = ScriptedAuthorizer(Ok(PaymentInfo::cash_on_delivery()));
        let context = PurchaseContext::SingleProduct(ProductId::from("p2"));
        let outcome =
            api.checkout(&buyer(), context, PaymentMethod::CashOnDelivery, &authorizer).await.unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.order.lines.len(), 1);
        assert_eq!(outcome.order.total_price, Money::from_cents(500));
        let remaining = db.cart_lines("buyer-1");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].product_id, ProductId::from("p1"));
        assert_eq!(db.stock("p2"), Some(9));
        assert_eq!(db.stock("p1"), Some(10));
    }
}
