use log::*;

use crate::{
    checkout_api::{checkout_objects::OrderIntent, errors::AuthorizationError},
    db_types::{PaymentInfo, PaymentMethod},
    traits::{Approval, GatewayClient, GatewayConfigProvider, GatewayError},
};

/// The payment-authorization capability the coordinator depends on. Implemented by [`PaymentAuthorizer`] for real
/// checkouts; tests substitute their own.
#[allow(async_fn_in_trait)]
pub trait AuthorizePayment {
    async fn authorize(&self, intent: &OrderIntent, method: PaymentMethod) -> Result<PaymentInfo, AuthorizationError>;
}

/// Obtains a payment result for an order intent, polymorphic over the buyer's chosen strategy.
///
/// * `Gateway` fetches the client id from configuration (a failure there is recoverable and surfaces as
///   `GatewayUnavailable`), creates a gateway-side order for the intent's total using the configured API secret,
///   then waits on the gateway's asynchronous approval. The capture's id and status are passed through verbatim; a gateway-reported error is
///   never turned into a success.
/// * `CashOnDelivery` is synchronous and deterministic; no external calls are made at all.
pub struct PaymentAuthorizer<G, C> {
    gateway: G,
    config: C,
    currency: String,
}

impl<G, C> PaymentAuthorizer<G, C> {
    pub fn new(gateway: G, config: C, currency: &str) -> Self {
        Self { gateway, config, currency: currency.to_string() }
    }
}

impl<G, C> AuthorizePayment for PaymentAuthorizer<G, C>
where
    G: GatewayClient,
    C: GatewayConfigProvider,
{
    async fn authorize(&self, intent: &OrderIntent, method: PaymentMethod) -> Result<PaymentInfo, AuthorizationError> {
        match method {
            PaymentMethod::CashOnDelivery => {
                debug!("💳️ Cash-on-delivery selected for {intent}. No gateway involved.");
                Ok(PaymentInfo::cash_on_delivery())
            },
            PaymentMethod::Gateway => self.authorize_via_gateway(intent).await,
        }
    }
}

impl<G, C> PaymentAuthorizer<G, C>
where
    G: GatewayClient,
    C: GatewayConfigProvider,
{
    async fn authorize_via_gateway(&self, intent: &OrderIntent) -> Result<PaymentInfo, AuthorizationError> {
        let client_id = self.config.client_id().await.map_err(|e| {
            warn!("💳️ Gateway checkout requested but no client id could be obtained. {e}");
            AuthorizationError::from(e)
        })?;
        trace!("💳️ Gateway session starting with client id {client_id}");
        let gateway_order_id = self
            .gateway
            .create_gateway_order(&self.config.api_secret(), intent.total_price, &self.currency)
            .await
            .map_err(map_gateway_error)?;
        debug!("💳️ Gateway order [{gateway_order_id}] created for {}. Awaiting buyer approval.", intent.total_price);
        let approval = self.gateway.await_approval(&gateway_order_id).await.map_err(map_gateway_error)?;
        match approval {
            Approval::Approved { capture_id, status } => {
                debug!("💳️ Gateway order [{gateway_order_id}] captured as [{capture_id}] with status {status}");
                Ok(PaymentInfo::gateway(capture_id, status))
            },
            Approval::Declined { reason } => {
                info!("💳️ Gateway order [{gateway_order_id}] was declined: {reason}");
                Err(AuthorizationError::PaymentDeclined(reason))
            },
            Approval::Abandoned => {
                debug!("💳️ Buyer abandoned gateway order [{gateway_order_id}] before approval");
                Err(AuthorizationError::Cancelled)
            },
        }
    }
}

fn map_gateway_error(e: GatewayError) -> AuthorizationError {
    match e {
        GatewayError::Unreachable(reason) => AuthorizationError::GatewayUnavailable(reason),
        GatewayError::Rejected(reason) => AuthorizationError::PaymentDeclined(reason),
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use sce_common::{Money, Secret};

    use super::*;
    use crate::{
        db_types::{ShippingAddress, COD_EXTERNAL_ID, COD_STATUS},
        traits::GatewayConfigError,
    };

    #[derive(Clone)]
    struct ScriptedGateway {
        approval: Result<Approval, GatewayError>,
        calls: Arc<AtomicUsize>,
        seen_secret: Arc<Mutex<Option<String>>>,
    }

    impl ScriptedGateway {
        fn new(approval: Result<Approval, GatewayError>) -> Self {
            Self { approval, calls: Arc::new(AtomicUsize::new(0)), seen_secret: Arc::new(Mutex::new(None)) }
        }
    }

    impl GatewayClient for ScriptedGateway {
        async fn create_gateway_order(
            &self,
            api_secret: &Secret<String>,
            _amount: Money,
            _currency: &str,
        ) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_secret.lock().unwrap() = Some(api_secret.reveal().clone());
            Ok("gw-order-1".to_string())
        }

        async fn await_approval(&self, _gateway_order_id: &str) -> Result<Approval, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.approval.clone()
        }
    }

    #[derive(Clone)]
    struct StaticConfig(Option<String>);

    impl GatewayConfigProvider for StaticConfig {
        async fn client_id(&self) -> Result<String, GatewayConfigError> {
            self.0.clone().ok_or_else(|| GatewayConfigError::Unavailable("not configured".to_string()))
        }

        fn api_secret(&self) -> Secret<String> {
            Secret::new("test-api-secret".to_string())
        }
    }

    fn intent() -> OrderIntent {
        OrderIntent {
            buyer_id: "buyer-1".to_string(),
            shipping: ShippingAddress::default(),
            lines: Vec::new(),
            total_quantity: 3,
            total_price: Money::from_cents(2500),
        }
    }

    #[tokio::test]
    async fn cod_is_deterministic_and_contacts_nothing() {
        let gateway = ScriptedGateway::new(Ok(Approval::Abandoned));
        let calls = gateway.calls.clone();
        let authorizer = PaymentAuthorizer::new(gateway, StaticConfig(None), "USD");
        let result = authorizer.authorize(&intent(), PaymentMethod::CashOnDelivery).await.unwrap();
        assert_eq!(result.external_id, COD_EXTERNAL_ID);
        assert_eq!(result.status, COD_STATUS);
        assert!(result.is_settled());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_config_surfaces_as_gateway_unavailable() {
        let gateway = ScriptedGateway::new(Ok(Approval::Abandoned));
        let calls = gateway.calls.clone();
        let authorizer = PaymentAuthorizer::new(gateway, StaticConfig(None), "USD");
        let err = authorizer.authorize(&intent(), PaymentMethod::Gateway).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::GatewayUnavailable(_)));
        // we never got as far as the gateway itself
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn capture_passes_through_id_and_status() {
        let approval = Approval::Approved { capture_id: "cap-77".to_string(), status: "COMPLETED".to_string() };
        let gateway = ScriptedGateway::new(Ok(approval));
        let authorizer = PaymentAuthorizer::new(gateway, StaticConfig(Some("client-1".to_string())), "USD");
        let result = authorizer.authorize(&intent(), PaymentMethod::Gateway).await.unwrap();
        assert_eq!(result.external_id, "cap-77");
        assert_eq!(result.status, "COMPLETED");
        assert!(result.is_settled());
    }

    #[tokio::test]
    async fn gateway_orders_are_created_with_the_configured_secret() {
        let approval = Approval::Approved { capture_id: "cap-9".to_string(), status: "COMPLETED".to_string() };
        let gateway = ScriptedGateway::new(Ok(approval));
        let seen = gateway.seen_secret.clone();
        let authorizer = PaymentAuthorizer::new(gateway, StaticConfig(Some("client-1".to_string())), "USD");
        authorizer.authorize(&intent(), PaymentMethod::Gateway).await.unwrap();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("test-api-secret"));
    }

    #[tokio::test]
    async fn decline_is_not_a_success() {
        let approval = Approval::Declined { reason: "insufficient funds".to_string() };
        let gateway = ScriptedGateway::new(Ok(approval));
        let authorizer = PaymentAuthorizer::new(gateway, StaticConfig(Some("client-1".to_string())), "USD");
        let err = authorizer.authorize(&intent(), PaymentMethod::Gateway).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::PaymentDeclined(_)));
    }

    #[tokio::test]
    async fn abandonment_is_a_cancellation() {
        let gateway = ScriptedGateway::new(Ok(Approval::Abandoned));
        let authorizer = PaymentAuthorizer::new(gateway, StaticConfig(Some("client-1".to_string())), "USD");
        let err = authorizer.authorize(&intent(), PaymentMethod::Gateway).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::Cancelled));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_unavailable() {
        let gateway = ScriptedGateway::new(Err(GatewayError::Unreachable("connection refused".to_string())));
        let authorizer = PaymentAuthorizer::new(gateway, StaticConfig(Some("client-1".to_string())), "USD");
        let err = authorizer.authorize(&intent(), PaymentMethod::Gateway).await.unwrap_err();
        assert!(matches!(err, AuthorizationError::GatewayUnavailable(_)));
    }
}
