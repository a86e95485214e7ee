pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod pesapal;
pub mod ports;
pub mod startup;
pub mod use_cases;
pub mod utils;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::config::AllowedOrigins;
use crate::metrics::PaymentMetrics;
use crate::middleware::RequestLogConfig;
use crate::pesapal::PaymentGateway;
use crate::ports::TransactionRepository;
use crate::use_cases::{CheckStatus, InitiatePayment, OrderSettings, ReconcilePayment};

#[derive(Clone)]
pub struct AppState {
    pub initiate_payment: Arc<InitiatePayment>,
    pub reconcile_payment: Arc<ReconcilePayment>,
    pub check_status: Arc<CheckStatus>,
    pub repository: Arc<dyn TransactionRepository>,
    pub metrics: Arc<PaymentMetrics>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        repository: Arc<dyn TransactionRepository>,
        settings: OrderSettings,
    ) -> Self {
        let metrics = Arc::new(PaymentMetrics::new());
        Self {
            initiate_payment: Arc::new(InitiatePayment::new(
                gateway.clone(),
                repository.clone(),
                metrics.clone(),
                settings,
            )),
            reconcile_payment: Arc::new(ReconcilePayment::new(
                gateway,
                repository.clone(),
                metrics.clone(),
            )),
            check_status: Arc::new(CheckStatus::new(repository.clone())),
            repository,
            metrics,
            start_time: Instant::now(),
        }
    }
}

/// HTTP-level options that do not belong to the payment flow itself.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub allowed_origins: AllowedOrigins,
    pub log_request_body: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            allowed_origins: AllowedOrigins::Any,
            log_request_body: false,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::payments::make_payment,
        handlers::payments::check_status,
        handlers::ipn::pesapal_ipn_callback,
    ),
    components(schemas(
        handlers::HealthResponse,
        handlers::payments::MakePaymentRequest,
        handlers::payments::MakePaymentResponse,
        handlers::payments::PaymentStatusResponse,
    )),
    tags(
        (name = "Payments", description = "Client-facing payment endpoints"),
        (name = "Pesapal", description = "Provider notification endpoint"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn create_app(state: AppState) -> Router {
    create_app_with(state, HttpOptions::default())
}

pub fn create_app_with(state: AppState, options: HttpOptions) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/api/make-payment", post(handlers::payments::make_payment))
        .route(
            "/api/check-status/:tracking_id",
            get(handlers::payments::check_status),
        )
        .route(
            config::IPN_CALLBACK_PATH,
            get(handlers::ipn::pesapal_ipn_callback),
        )
        .layer(axum::middleware::from_fn_with_state(
            RequestLogConfig {
                log_body: options.log_request_body,
            },
            middleware::request_logger_middleware,
        ))
        .layer(cors_layer(&options.allowed_origins))
        .with_state(state)
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origins {
        AllowedOrigins::Any => layer.allow_origin(Any),
        AllowedOrigins::List(list) => {
            let origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect();
            layer.allow_origin(origins)
        }
    }
}
