//! Initiate payment use case.
//! Drives authenticate -> register IPN -> submit order, then records the
//! attempt as Pending.

use std::sync::Arc;

use super::PaymentError;
use crate::domain::{new_tracking_id, Transaction};
use crate::metrics::PaymentMetrics;
use crate::pesapal::{BillingAddress, PaymentGateway, SubmitOrderRequest};
use crate::ports::TransactionRepository;

const ORDER_LANGUAGE: &str = "EN";

/// Order parameters that come from configuration rather than the caller.
#[derive(Debug, Clone)]
pub struct OrderSettings {
    /// Full URL Pesapal calls for notifications.
    pub ipn_callback_url: String,
    pub currency: String,
    /// Where the payer's browser is sent after checkout.
    pub redirect_url: String,
}

/// Input for the InitiatePayment use case.
#[derive(Debug, Clone, Default)]
pub struct PaymentInput {
    pub amount: Option<f64>,
    pub phone: Option<String>,
}

impl PaymentInput {
    /// Zero amounts and blank phone numbers count as missing.
    fn validated(self) -> Result<(f64, String), PaymentError> {
        let amount = self.amount.filter(|a| *a != 0.0);
        let phone = self.phone.filter(|p| !p.trim().is_empty());
        match (amount, phone) {
            (Some(amount), Some(phone)) => Ok((amount, phone)),
            _ => Err(PaymentError::MissingPaymentDetails),
        }
    }
}

/// Output of the InitiatePayment use case. Only the internal id leaves the
/// service; the provider's id stays in the store.
#[derive(Debug, Clone)]
pub struct PaymentOutput {
    pub tracking_id: String,
}

pub struct InitiatePayment {
    gateway: Arc<dyn PaymentGateway>,
    transaction_repository: Arc<dyn TransactionRepository>,
    metrics: Arc<PaymentMetrics>,
    settings: OrderSettings,
}

impl InitiatePayment {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        transaction_repository: Arc<dyn TransactionRepository>,
        metrics: Arc<PaymentMetrics>,
        settings: OrderSettings,
    ) -> Self {
        Self {
            gateway,
            transaction_repository,
            metrics,
            settings,
        }
    }

    pub async fn execute(&self, input: PaymentInput) -> Result<PaymentOutput, PaymentError> {
        let (amount, phone) = input.validated()?;
        let result = self.initiate(amount, phone).await;
        match &result {
            Ok(_) => self.metrics.record_payment_initiated(),
            Err(_) => self.metrics.record_initiation_failure(),
        }
        result
    }

    async fn initiate(&self, amount: f64, phone: String) -> Result<PaymentOutput, PaymentError> {
        let tracking_id = new_tracking_id();
        tracing::info!(
            tracking_id = %tracking_id,
            amount = amount,
            "New payment request"
        );

        let token = self.gateway.authenticate().await.map_err(|e| {
            tracing::error!(tracking_id = %tracking_id, error = %e, "Pesapal authentication failed");
            PaymentError::AuthenticationFailed(e)
        })?;

        // No rollback of this registration if the order is refused below.
        let ipn_id = self
            .gateway
            .register_ipn(&token, &self.settings.ipn_callback_url)
            .await
            .map_err(|e| {
                tracing::error!(tracking_id = %tracking_id, error = %e, "IPN registration failed");
                PaymentError::CallbackRegistrationFailed(e)
            })?;

        let order = SubmitOrderRequest {
            language: ORDER_LANGUAGE.to_string(),
            currency: self.settings.currency.clone(),
            amount,
            description: format!(
                "Payment for order {}",
                Transaction::short_reference(&tracking_id)
            ),
            callback_url: self.settings.redirect_url.clone(),
            notification_id: ipn_id,
            id: tracking_id.clone(),
            billing_address: BillingAddress {
                phone_number: phone.clone(),
            },
        };

        let response = self
            .gateway
            .submit_order(&token, &order)
            .await
            .map_err(|e| {
                tracing::error!(tracking_id = %tracking_id, error = %e, "Order submission failed");
                PaymentError::InitiationFailed(e.to_string())
            })?;

        if let Some(rejection) = response.rejection() {
            tracing::error!(
                tracking_id = %tracking_id,
                error = %rejection,
                status = ?response.status,
                "Pesapal rejected the order"
            );
            return Err(PaymentError::InitiationFailed(rejection.to_string()));
        }

        let provider_tracking_id = response
            .order_tracking_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                tracing::error!(tracking_id = %tracking_id, "Order response carried no order_tracking_id");
                PaymentError::InitiationFailed(
                    "provider response did not include an order tracking id".to_string(),
                )
            })?;

        let tx = Transaction::new(tracking_id, provider_tracking_id, amount, phone);
        let inserted = self.transaction_repository.insert(&tx).await?;

        tracing::info!(
            tracking_id = %inserted.tracking_id,
            provider_tracking_id = %inserted.provider_tracking_id,
            "Payment initiated"
        );

        Ok(PaymentOutput {
            tracking_id: inserted.tracking_id,
        })
    }
}
