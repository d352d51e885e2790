use thiserror::Error;

use crate::traits::GatewayConfigError;

/// Errors raised while building an order intent. These abort the attempt before any payment or durable write, so
/// the buyer can always retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("There is nothing purchasable in the selection")]
    EmptySelection,
    #[error("Invalid order line: {0}")]
    InvalidLine(String),
}

/// Errors raised while obtaining payment authorization. Nothing durable has been written yet when these occur.
#[derive(Debug, Clone, Error)]
pub enum AuthorizationError {
    #[error("The payment gateway is unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("The payment was declined: {0}")]
    PaymentDeclined(String),
    /// The buyer abandoned the flow before approving the payment. Not a fault; no message should be shown.
    #[error("The buyer cancelled the checkout")]
    Cancelled,
}

impl From<GatewayConfigError> for AuthorizationError {
    fn from(e: GatewayConfigError) -> Self {
        AuthorizationError::GatewayUnavailable(e.to_string())
    }
}

/// The terminal failure of a checkout attempt.
///
/// Everything up to and including authorization is fully recoverable. [`CheckoutError::OrderWrite`] is the one
/// variant where money has already moved: the payment was captured but the order record could not be written. It
/// is never retried automatically (a blind retry risks a duplicate order) and must be surfaced to the buyer
/// distinctly.
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("There is nothing purchasable in the selection")]
    EmptySelection,
    #[error("Invalid order line: {0}")]
    InvalidLine(String),
    #[error("The payment gateway is unavailable: {0}")]
    GatewayUnavailable(String),
    #[error("The payment was declined: {0}")]
    PaymentDeclined(String),
    #[error("The buyer cancelled the checkout")]
    Cancelled,
    #[error("The payment reported an unrecognized status: {0}")]
    UnrecognizedPaymentStatus(String),
    #[error("Payment received, but recording the order failed: {0}")]
    OrderWrite(String),
    #[error("Could not read the buyer's cart: {0}")]
    CartRead(String),
}

impl From<IntentError> for CheckoutError {
    fn from(e: IntentError) -> Self {
        match e {
            IntentError::EmptySelection => CheckoutError::EmptySelection,
            IntentError::InvalidLine(line) => CheckoutError::InvalidLine(line),
        }
    }
}

impl From<AuthorizationError> for CheckoutError {
    fn from(e: AuthorizationError) -> Self {
        match e {
            AuthorizationError::GatewayUnavailable(reason) => CheckoutError::GatewayUnavailable(reason),
            AuthorizationError::PaymentDeclined(reason) => CheckoutError::PaymentDeclined(reason),
            AuthorizationError::Cancelled => CheckoutError::Cancelled,
        }
    }
}

/// How a failed attempt should be presented: `Failed` is a business rejection ("Order Failed"), `Error` is an
/// infrastructure fault ("Network Error"), and `Cancelled` is the buyer walking away, which gets no message at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Failed,
    Error,
    Cancelled,
}

impl CheckoutError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CheckoutError::GatewayUnavailable(_) | CheckoutError::CartRead(_) => FailureKind::Error,
            CheckoutError::Cancelled => FailureKind::Cancelled,
            CheckoutError::EmptySelection
            | CheckoutError::InvalidLine(_)
            | CheckoutError::PaymentDeclined(_)
            | CheckoutError::UnrecognizedPaymentStatus(_)
            | CheckoutError::OrderWrite(_) => FailureKind::Failed,
        }
    }
}
