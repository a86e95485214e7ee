//! Payment lifecycle use cases: initiate, reconcile, poll.

pub mod check_status;
pub mod initiate_payment;
pub mod reconcile_payment;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

use crate::pesapal::GatewayError;
use crate::ports::RepositoryError;

pub use check_status::CheckStatus;
pub use initiate_payment::{InitiatePayment, OrderSettings, PaymentInput, PaymentOutput};
pub use reconcile_payment::{Acknowledgment, IpnNotification, ReconcileOutcome, ReconcilePayment};

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Amount and Phone Number are required")]
    MissingPaymentDetails,

    #[error("Failed to authenticate with payment provider. Check your credentials.")]
    AuthenticationFailed(#[source] GatewayError),

    #[error("Failed to register notification URL. Check your public domain configuration.")]
    CallbackRegistrationFailed(#[source] GatewayError),

    #[error("Payment initiation failed: {0}")]
    InitiationFailed(String),

    #[error("Missing parameters")]
    MissingParameters,

    #[error("Unknown transaction: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for PaymentError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => PaymentError::NotFound(id),
            other => PaymentError::Storage(other),
        }
    }
}
