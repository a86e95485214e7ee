use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::models::{
    AccessToken, AuthRequest, AuthResponse, RegisterIpnRequest, RegisterIpnResponse,
    SubmitOrderRequest, SubmitOrderResponse, TransactionStatus,
};
use super::PaymentGateway;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const PLACEHOLDER_DOMAIN_MARKER: &str = "your-live-backend-app";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Pesapal returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Pesapal credentials are placeholders")]
    PlaceholderCredentials,
    #[error("Public callback URL is a placeholder: {0}")]
    PlaceholderCallbackUrl(String),
    #[error("Pesapal rejected the request: {0}")]
    Rejected(String),
    #[error("Invalid response from Pesapal: {0}")]
    InvalidResponse(String),
}

/// True for empty values and the `YOUR_...` stand-ins shipped in sample configs.
pub fn is_placeholder_credential(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.starts_with("YOUR_")
}

pub fn is_placeholder_url(url: &str) -> bool {
    let url = url.trim();
    url.is_empty() || url.contains(PLACEHOLDER_DOMAIN_MARKER)
}

#[derive(Clone)]
pub struct PesapalCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl PesapalCredentials {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        is_placeholder_credential(&self.consumer_key)
            || is_placeholder_credential(&self.consumer_secret)
    }
}

impl fmt::Debug for PesapalCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PesapalCredentials")
            .field("consumer_key", &crate::utils::sanitize::mask_str(&self.consumer_key))
            .field("consumer_secret", &"****")
            .finish()
    }
}

/// HTTP client for the Pesapal v3 API. Every call is a single attempt.
#[derive(Clone)]
pub struct PesapalClient {
    client: Client,
    base_url: String,
    credentials: PesapalCredentials,
}

impl PesapalClient {
    /// Creates a new PesapalClient against the given API domain
    pub fn new(base_url: String, credentials: PesapalCredentials) -> Self {
        Self::with_timeout(
            base_url,
            credentials,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(base_url: String, credentials: PesapalCredentials, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        PesapalClient {
            client,
            base_url,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v3/api/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Turns a non-2xx response into `GatewayError::Status`, otherwise decodes JSON.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl PaymentGateway for PesapalClient {
    async fn authenticate(&self) -> Result<AccessToken, GatewayError> {
        if self.credentials.is_placeholder() {
            tracing::warn!("Using placeholder Pesapal credentials; authentication skipped");
            return Err(GatewayError::PlaceholderCredentials);
        }

        let url = self.endpoint("Auth/RequestToken");
        tracing::debug!(url = %url, "Requesting Pesapal token");

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&AuthRequest {
                consumer_key: &self.credentials.consumer_key,
                consumer_secret: &self.credentials.consumer_secret,
            })
            .send()
            .await?;

        let body: AuthResponse = read_json(response).await?;
        if let Some(error) = body.rejection() {
            return Err(GatewayError::Rejected(error.to_string()));
        }

        match body.token.filter(|t| !t.is_empty()) {
            Some(token) => {
                tracing::info!("Obtained Pesapal token");
                Ok(AccessToken::new(token))
            }
            None => Err(GatewayError::InvalidResponse(
                body.message
                    .unwrap_or_else(|| "token missing from auth response".to_string()),
            )),
        }
    }

    async fn register_ipn(
        &self,
        token: &AccessToken,
        callback_url: &str,
    ) -> Result<String, GatewayError> {
        if is_placeholder_url(callback_url) {
            tracing::warn!(callback_url = %callback_url, "Placeholder public domain; IPN registration skipped");
            return Err(GatewayError::PlaceholderCallbackUrl(callback_url.to_string()));
        }

        let url = self.endpoint("URLSetup/RegisterIPN");
        tracing::debug!(callback_url = %callback_url, "Registering IPN URL");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .header("Accept", "application/json")
            .json(&RegisterIpnRequest {
                url: callback_url,
                ipn_notification_type: "GET",
            })
            .send()
            .await?;

        let body: RegisterIpnResponse = read_json(response).await?;
        if let Some(error) = body.rejection() {
            return Err(GatewayError::Rejected(error.to_string()));
        }

        let ipn_id = body
            .ipn_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::InvalidResponse("ipn_id missing".to_string()))?;
        tracing::info!(ipn_id = %ipn_id, "Registered IPN URL");
        Ok(ipn_id)
    }

    async fn submit_order(
        &self,
        token: &AccessToken,
        order: &SubmitOrderRequest,
    ) -> Result<SubmitOrderResponse, GatewayError> {
        let url = self.endpoint("Transactions/SubmitOrderRequest");
        tracing::info!(tracking_id = %order.id, "Submitting order request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .header("Accept", "application/json")
            .json(order)
            .send()
            .await?;

        let body: SubmitOrderResponse = read_json(response).await?;
        tracing::debug!(
            tracking_id = %order.id,
            order_tracking_id = ?body.order_tracking_id,
            status = ?body.status,
            "Pesapal order response"
        );
        Ok(body)
    }

    async fn query_status(
        &self,
        token: &AccessToken,
        order_tracking_id: &str,
    ) -> Result<TransactionStatus, GatewayError> {
        let url = self.endpoint("Transactions/GetTransactionStatus");

        let response = self
            .client
            .get(&url)
            .query(&[("orderTrackingId", order_tracking_id)])
            .bearer_auth(token.as_str())
            .header("Accept", "application/json")
            .send()
            .await?;

        // Failed payments come back with an error object next to the status
        // description, so the body is returned as-is.
        read_json(response).await
    }
}
