//! Transaction domain entity.
//! Framework-agnostic record of one payment attempt relayed to Pesapal.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Status every record starts in until a notification reconciles it.
pub const PENDING_STATUS: &str = "Pending";

/// Generates a fresh internal tracking id.
pub fn new_tracking_id() -> String {
    Uuid::new_v4().to_string()
}

/// Domain entity representing a payment attempt.
///
/// `status` is free-form: it holds whatever description the provider last
/// reported, so it is deliberately not a closed enum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub tracking_id: String,
    pub status: String,
    pub provider_tracking_id: String,
    pub amount: f64,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        tracking_id: String,
        provider_tracking_id: String,
        amount: f64,
        phone: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            tracking_id,
            status: PENDING_STATUS.to_string(),
            provider_tracking_id,
            amount,
            phone,
            created_at: now,
            updated_at: now,
        }
    }

    /// Short prefix of the tracking id used in order descriptions.
    pub fn short_reference(tracking_id: &str) -> String {
        tracking_id.chars().take(8).collect()
    }
}
