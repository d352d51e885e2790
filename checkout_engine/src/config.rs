use std::env;

use log::*;
use sce_common::{Secret, DEFAULT_CURRENCY_CODE};

use crate::traits::{GatewayConfigError, GatewayConfigProvider};

/// Gateway credentials and checkout settings, read from the environment.
///
/// * `SCE_GATEWAY_CLIENT_ID`: the client id handed to the gateway SDK. Required for gateway checkouts.
/// * `SCE_GATEWAY_SECRET`: the gateway API secret. Never logged.
/// * `SCE_CURRENCY`: ISO currency code for gateway orders. Defaults to USD.
#[derive(Clone, Debug, Default)]
pub struct GatewayConfig {
    pub client_id: Option<String>,
    pub secret: Secret<String>,
    pub currency: String,
}

impl GatewayConfig {
    pub fn new(client_id: &str, currency: &str) -> Self {
        Self { client_id: Some(client_id.to_string()), secret: Secret::default(), currency: currency.to_string() }
    }

    pub fn from_env_or_default() -> Self {
        let client_id = env::var("SCE_GATEWAY_CLIENT_ID").ok().filter(|s| !s.trim().is_empty());
        if client_id.is_none() {
            warn!(
                "🪛️ SCE_GATEWAY_CLIENT_ID is not set. Gateway payments will be unavailable until it is configured; \
                 cash-on-delivery checkouts are unaffected."
            );
        }
        let secret = Secret::new(env::var("SCE_GATEWAY_SECRET").ok().unwrap_or_default());
        let currency = env::var("SCE_CURRENCY").ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            debug!("🪛️ SCE_CURRENCY is not set. Using the default, {DEFAULT_CURRENCY_CODE}.");
            DEFAULT_CURRENCY_CODE.to_string()
        });
        Self { client_id, secret, currency }
    }
}

impl GatewayConfigProvider for GatewayConfig {
    async fn client_id(&self) -> Result<String, GatewayConfigError> {
        self.client_id
            .clone()
            .ok_or_else(|| GatewayConfigError::Unavailable("no gateway client id is configured".to_string()))
    }

    fn api_secret(&self) -> Secret<String> {
        self.secret.clone()
    }
}
