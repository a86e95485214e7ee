use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::use_cases::{IpnNotification, PaymentError};
use crate::AppState;

/// Query string Pesapal sends with a GET notification.
#[derive(Debug, Default, Deserialize)]
pub struct IpnQuery {
    #[serde(rename = "OrderTrackingId")]
    pub order_tracking_id: Option<String>,
    #[serde(rename = "OrderMerchantReference")]
    pub merchant_reference: Option<String>,
}

/// Plain-text endpoint Pesapal calls on status changes.
///
/// A 200 carries the acknowledgment body Pesapal requires even when the
/// status refresh itself failed; otherwise the provider keeps re-delivering.
#[utoipa::path(
    get,
    path = "/api/pesapal-ipn-callback",
    params(
        ("OrderTrackingId" = String, Query, description = "Pesapal's tracking id"),
        ("OrderMerchantReference" = String, Query, description = "Internal tracking id")
    ),
    responses(
        (status = 200, description = "Notification acknowledged", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing parameters", body = String, content_type = "text/plain"),
        (status = 404, description = "Unknown transaction", body = String, content_type = "text/plain")
    ),
    tag = "Pesapal"
)]
pub async fn pesapal_ipn_callback(
    State(state): State<AppState>,
    Query(query): Query<IpnQuery>,
) -> impl IntoResponse {
    let notification = IpnNotification {
        order_tracking_id: query.order_tracking_id,
        merchant_reference: query.merchant_reference,
    };

    match state.reconcile_payment.execute(notification).await {
        Ok(ack) => (StatusCode::OK, ack.body()),
        Err(PaymentError::MissingParameters) => (
            StatusCode::BAD_REQUEST,
            "IPN Error: Missing parameters".to_string(),
        ),
        Err(PaymentError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            "IPN Error: Unknown transaction".to_string(),
        ),
        Err(e) => {
            tracing::error!(error = %e, "IPN handling failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IPN Error: Internal error".to_string(),
            )
        }
    }
}
