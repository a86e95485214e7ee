use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::use_cases::{PaymentError, PaymentInput};
use crate::AppState;

pub const INITIATED_MESSAGE: &str = "Transaction initiated. Please check your phone to enter PIN.";
/// Status reported for tracking ids this service never issued.
pub const INVALID_STATUS: &str = "Invalid";

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MakePaymentRequest {
    pub amount: Option<f64>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MakePaymentResponse {
    pub message: String,
    /// Internal tracking id to poll with; not Pesapal's id.
    pub order_tracking_id: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PaymentStatusResponse {
    pub payment_status: String,
}

#[utoipa::path(
    post,
    path = "/api/make-payment",
    request_body = MakePaymentRequest,
    responses(
        (status = 200, description = "Payment initiated", body = MakePaymentResponse),
        (status = 400, description = "Amount or phone missing"),
        (status = 500, description = "Pesapal authentication, IPN registration or order submission failed")
    ),
    tag = "Payments"
)]
pub async fn make_payment(
    State(state): State<AppState>,
    payload: Result<Json<MakePaymentRequest>, JsonRejection>,
) -> Result<Json<MakePaymentResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected payment request body");
        AppError::from(PaymentError::MissingPaymentDetails)
    })?;

    let output = state
        .initiate_payment
        .execute(PaymentInput {
            amount: payload.amount,
            phone: payload.phone,
        })
        .await?;

    Ok(Json(MakePaymentResponse {
        message: INITIATED_MESSAGE.to_string(),
        order_tracking_id: output.tracking_id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/check-status/{tracking_id}",
    params(
        ("tracking_id" = String, Path, description = "Internal tracking id returned by make-payment")
    ),
    responses(
        (status = 200, description = "Current stored status", body = PaymentStatusResponse),
        (status = 404, description = "Unknown tracking id", body = PaymentStatusResponse)
    ),
    tag = "Payments"
)]
pub async fn check_status(
    State(state): State<AppState>,
    Path(tracking_id): Path<String>,
) -> Response {
    match state.check_status.execute(&tracking_id).await {
        Ok(payment_status) => {
            (StatusCode::OK, Json(PaymentStatusResponse { payment_status })).into_response()
        }
        Err(PaymentError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(PaymentStatusResponse {
                payment_status: INVALID_STATUS.to_string(),
            }),
        )
            .into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}
