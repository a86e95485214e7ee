//! Reconcile use case, run when Pesapal sends an IPN.
//!
//! The notifier always gets an acknowledgment once the record is known;
//! upstream failures only surface in logs and metrics. The caller is not
//! authenticated: anyone holding a valid id pair can trigger a refresh.

use std::sync::Arc;

use super::PaymentError;
use crate::metrics::PaymentMetrics;
use crate::pesapal::PaymentGateway;
use crate::ports::TransactionRepository;

/// Identifiers carried by an IPN request.
#[derive(Debug, Clone, Default)]
pub struct IpnNotification {
    /// Pesapal's `OrderTrackingId`.
    pub order_tracking_id: Option<String>,
    /// Pesapal's `OrderMerchantReference`, i.e. our internal tracking id.
    pub merchant_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Updated { previous: String, status: String },
    AuthenticationFailed,
    StatusQueryFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgment {
    pub order_tracking_id: String,
    pub merchant_reference: String,
    pub outcome: ReconcileOutcome,
}

impl Acknowledgment {
    /// Response body Pesapal expects, byte for byte.
    pub fn body(&self) -> String {
        format!(
            "pesapal_notification_id={}&pesapal_tracking_id={}&pesapal_merchant_reference={}",
            self.order_tracking_id, self.order_tracking_id, self.merchant_reference
        )
    }
}

pub struct ReconcilePayment {
    gateway: Arc<dyn PaymentGateway>,
    transaction_repository: Arc<dyn TransactionRepository>,
    metrics: Arc<PaymentMetrics>,
}

impl ReconcilePayment {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        transaction_repository: Arc<dyn TransactionRepository>,
        metrics: Arc<PaymentMetrics>,
    ) -> Self {
        Self {
            gateway,
            transaction_repository,
            metrics,
        }
    }

    pub async fn execute(&self, notification: IpnNotification) -> Result<Acknowledgment, PaymentError> {
        self.metrics.record_ipn_notification();

        let order_tracking_id = notification.order_tracking_id.filter(|id| !id.is_empty());
        let merchant_reference = notification.merchant_reference.filter(|id| !id.is_empty());
        let (order_tracking_id, merchant_reference) = match (order_tracking_id, merchant_reference) {
            (Some(order), Some(merchant)) => (order, merchant),
            _ => {
                tracing::warn!("IPN call missing required parameters");
                return Err(PaymentError::MissingParameters);
            }
        };

        tracing::info!(
            tracking_id = %merchant_reference,
            provider_tracking_id = %order_tracking_id,
            "IPN received"
        );

        if let Err(e) = self.transaction_repository.get_by_id(&merchant_reference).await {
            tracing::warn!(tracking_id = %merchant_reference, "IPN received for an unknown transaction");
            return Err(e.into());
        }

        let outcome = self.refresh_status(&order_tracking_id, &merchant_reference).await?;
        match &outcome {
            ReconcileOutcome::Updated { .. } => self.metrics.record_reconciliation(),
            _ => self.metrics.record_reconciliation_failure(),
        }

        Ok(Acknowledgment {
            order_tracking_id,
            merchant_reference,
            outcome,
        })
    }

    async fn refresh_status(
        &self,
        order_tracking_id: &str,
        merchant_reference: &str,
    ) -> Result<ReconcileOutcome, PaymentError> {
        let token = match self.gateway.authenticate().await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(
                    tracking_id = %merchant_reference,
                    error = %e,
                    "Could not get token to verify IPN"
                );
                return Ok(ReconcileOutcome::AuthenticationFailed);
            }
        };

        let status = match self.gateway.query_status(&token, order_tracking_id).await {
            Ok(details) => match details.description() {
                Some(description) => description.to_string(),
                None => {
                    tracing::error!(
                        tracking_id = %merchant_reference,
                        "Status response carried no status description"
                    );
                    return Ok(ReconcileOutcome::StatusQueryFailed);
                }
            },
            Err(e) => {
                tracing::error!(
                    tracking_id = %merchant_reference,
                    provider_tracking_id = %order_tracking_id,
                    error = %e,
                    "Could not verify transaction status after IPN"
                );
                return Ok(ReconcileOutcome::StatusQueryFailed);
            }
        };

        // No forward-only check: the provider's latest word wins.
        let previous = self
            .transaction_repository
            .update_status(merchant_reference, &status)
            .await?;

        tracing::info!(
            tracking_id = %merchant_reference,
            previous = %previous.status,
            status = %status,
            "Status reconciled from Pesapal"
        );

        Ok(ReconcileOutcome::Updated {
            previous: previous.status,
            status,
        })
    }
}
