use sce_common::{Money, Secret};
use thiserror::Error;

/// The seam to the online payment gateway.
///
/// The exchange is the redirect/callback pattern: the engine creates a gateway-side order for the amount, the buyer
/// approves (or abandons) it out-of-band, and the gateway reports the approval outcome. `await_approval` is the
/// only suspension point in a checkout attempt; the coordinator does not move past `AwaitingPayment` until it
/// resolves.
#[allow(async_fn_in_trait)]
pub trait GatewayClient {
    /// Create a gateway-side order for the given amount, authenticating with the API secret. Returns the
    /// gateway's order id.
    async fn create_gateway_order(
        &self,
        api_secret: &Secret<String>,
        amount: Money,
        currency: &str,
    ) -> Result<String, GatewayError>;

    /// Wait for the buyer to approve or abandon the gateway order, then capture the authorized amount.
    async fn await_approval(&self, gateway_order_id: &str) -> Result<Approval, GatewayError>;
}

/// The terminal outcome of the gateway's asynchronous approval callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    /// The buyer approved and the amount was captured.
    Approved { capture_id: String, status: String },
    /// The gateway refused the charge.
    Declined { reason: String },
    /// The buyer abandoned the flow before approving. No charge was made.
    Abandoned,
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not reach the payment gateway: {0}")]
    Unreachable(String),
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
}

/// Supplies the gateway credentials for a checkout session. The client id is consumed once per session; failure
/// there is recoverable, the buyer simply cannot use the gateway until configuration is fixed. The API secret is
/// held server-side and passed to [`GatewayClient::create_gateway_order`], never to the buyer.
#[allow(async_fn_in_trait)]
pub trait GatewayConfigProvider {
    async fn client_id(&self) -> Result<String, GatewayConfigError>;

    fn api_secret(&self) -> Secret<String>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayConfigError {
    #[error("Gateway configuration is unavailable: {0}")]
    Unavailable(String),
}
