//! Wire types for the Pesapal v3 API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token returned by `Auth/RequestToken`.
#[derive(Clone, PartialEq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(****)")
    }
}

/// Error object Pesapal embeds in otherwise successful (2xx) responses.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ProviderError {
    Detailed {
        error_type: Option<String>,
        code: Option<String>,
        message: Option<String>,
    },
    Message(String),
}

impl ProviderError {
    /// Pesapal sometimes sends an error object with every field null.
    pub fn is_empty(&self) -> bool {
        match self {
            ProviderError::Detailed {
                error_type,
                code,
                message,
            } => error_type.is_none() && code.is_none() && message.is_none(),
            ProviderError::Message(message) => message.is_empty(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Detailed {
                error_type,
                code,
                message,
            } => {
                let text = [message, code, error_type]
                    .into_iter()
                    .filter_map(|field| field.as_deref())
                    .find(|s| !s.is_empty())
                    .unwrap_or("unknown provider error");
                f.write_str(text)
            }
            ProviderError::Message(message) => f.write_str(message),
        }
    }
}

fn present(error: &Option<ProviderError>) -> Option<&ProviderError> {
    error.as_ref().filter(|e| !e.is_empty())
}

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: Option<String>,
    #[serde(rename = "expiryDate")]
    pub expiry_date: Option<String>,
    pub error: Option<ProviderError>,
    pub status: Option<String>,
    pub message: Option<String>,
}

impl AuthResponse {
    pub fn rejection(&self) -> Option<&ProviderError> {
        present(&self.error)
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterIpnRequest<'a> {
    pub url: &'a str,
    pub ipn_notification_type: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterIpnResponse {
    pub ipn_id: Option<String>,
    pub url: Option<String>,
    pub error: Option<ProviderError>,
    pub status: Option<String>,
}

impl RegisterIpnResponse {
    pub fn rejection(&self) -> Option<&ProviderError> {
        present(&self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingAddress {
    pub phone_number: String,
}

/// Body of `Transactions/SubmitOrderRequest`; `id` carries our internal
/// tracking id and comes back as `OrderMerchantReference` in notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitOrderRequest {
    pub language: String,
    pub currency: String,
    pub amount: f64,
    pub description: String,
    pub callback_url: String,
    pub notification_id: String,
    pub id: String,
    pub billing_address: BillingAddress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOrderResponse {
    pub order_tracking_id: Option<String>,
    pub merchant_reference: Option<String>,
    pub redirect_url: Option<String>,
    pub error: Option<ProviderError>,
    pub status: Option<String>,
}

impl SubmitOrderResponse {
    /// The provider's reason for refusing the order, if it refused it.
    pub fn rejection(&self) -> Option<&ProviderError> {
        present(&self.error)
    }
}

/// Result of `Transactions/GetTransactionStatus`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionStatus {
    pub payment_method: Option<String>,
    pub confirmation_code: Option<String>,
    pub merchant_reference: Option<String>,
    pub status_code_description: Option<String>,
    pub payment_status_description: Option<String>,
    pub error: Option<ProviderError>,
}

impl TransactionStatus {
    pub fn description(&self) -> Option<&str> {
        self.status_code_description
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(self.payment_status_description.as_deref())
            .filter(|d| !d.is_empty())
    }
}
