//! Outbound integration with the Pesapal payment gateway.

pub mod client;
pub mod models;

use async_trait::async_trait;

pub use client::{
    is_placeholder_credential, is_placeholder_url, GatewayError, PesapalClient,
    PesapalCredentials,
};
pub use models::{
    AccessToken, BillingAddress, ProviderError, SubmitOrderRequest, SubmitOrderResponse,
    TransactionStatus,
};

/// The four provider operations the payment use cases depend on.
///
/// Implementations never retry; callers thread the token from
/// `authenticate` through the other calls.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn authenticate(&self) -> Result<AccessToken, GatewayError>;

    /// Registers `callback_url` for notifications and returns the IPN id.
    async fn register_ipn(
        &self,
        token: &AccessToken,
        callback_url: &str,
    ) -> Result<String, GatewayError>;

    async fn submit_order(
        &self,
        token: &AccessToken,
        order: &SubmitOrderRequest,
    ) -> Result<SubmitOrderResponse, GatewayError>;

    async fn query_status(
        &self,
        token: &AccessToken,
        order_tracking_id: &str,
    ) -> Result<TransactionStatus, GatewayError>;
}
