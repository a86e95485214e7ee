use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::AppState;

/// Process-local counters for the payment lifecycle.
///
/// Reconciliation failures never reach the notifying party (it always gets
/// a 200), so this counter is the only place they are visible besides logs.
#[derive(Debug, Default)]
pub struct PaymentMetrics {
    payments_initiated: AtomicU64,
    payment_initiation_failures: AtomicU64,
    ipn_notifications: AtomicU64,
    reconciliations: AtomicU64,
    reconciliation_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub payments_initiated: u64,
    pub payment_initiation_failures: u64,
    pub ipn_notifications: u64,
    pub reconciliations: u64,
    pub reconciliation_failures: u64,
}

impl PaymentMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_payment_initiated(&self) {
        self.payments_initiated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_initiation_failure(&self) {
        self.payment_initiation_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ipn_notification(&self) {
        self.ipn_notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconciliation(&self) {
        self.reconciliations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconciliation_failure(&self) {
        self.reconciliation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            payments_initiated: self.payments_initiated.load(Ordering::Relaxed),
            payment_initiation_failures: self
                .payment_initiation_failures
                .load(Ordering::Relaxed),
            ipn_notifications: self.ipn_notifications.load(Ordering::Relaxed),
            reconciliations: self.reconciliations.load(Ordering::Relaxed),
            reconciliation_failures: self.reconciliation_failures.load(Ordering::Relaxed),
        }
    }

    /// Prometheus text exposition format.
    pub fn render(&self) -> String {
        let snapshot = self.snapshot();
        let counters = [
            (
                "payments_initiated_total",
                "Payments accepted by the provider",
                snapshot.payments_initiated,
            ),
            (
                "payment_initiation_failures_total",
                "Payment initiations that failed upstream",
                snapshot.payment_initiation_failures,
            ),
            (
                "ipn_notifications_total",
                "IPN notifications received",
                snapshot.ipn_notifications,
            ),
            (
                "reconciliations_total",
                "Stored statuses refreshed from the provider",
                snapshot.reconciliations,
            ),
            (
                "reconciliation_failures_total",
                "Notifications acknowledged without a status refresh",
                snapshot.reconciliation_failures,
            ),
        ];

        let mut out = String::new();
        for (name, help, value) in counters {
            let _ = writeln!(out, "# HELP {} {}", name, help);
            let _ = writeln!(out, "# TYPE {} counter", name);
            let _ = writeln!(out, "{} {}", name, value);
        }
        out
    }
}

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
