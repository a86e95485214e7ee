#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use mockito::{Matcher, Mock, ServerGuard};
use pesapal_bridge::adapters::InMemoryTransactionRepository;
use pesapal_bridge::pesapal::{PesapalClient, PesapalCredentials};
use pesapal_bridge::use_cases::OrderSettings;
use pesapal_bridge::{create_app, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const IPN_CALLBACK_URL: &str = "https://relay.example.org/api/pesapal-ipn-callback";

pub struct TestApp {
    pub app: Router,
    pub repository: Arc<InMemoryTransactionRepository>,
    pub state: AppState,
    pub server: ServerGuard,
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_settings(OrderSettings {
        ipn_callback_url: IPN_CALLBACK_URL.to_string(),
        currency: "TZS".to_string(),
        redirect_url: "https://www.google.com/".to_string(),
    })
    .await
}

pub async fn setup_test_app_with_settings(settings: OrderSettings) -> TestApp {
    let server = mockito::Server::new_async().await;
    let gateway = PesapalClient::new(
        server.url(),
        PesapalCredentials::new("consumer-key", "consumer-secret"),
    );
    let repository = Arc::new(InMemoryTransactionRepository::new());
    let state = AppState::new(Arc::new(gateway), repository.clone(), settings);
    let app = create_app(state.clone());

    TestApp {
        app,
        repository,
        state,
        server,
    }
}

impl TestApp {
    pub async fn mock_auth(&mut self) -> Mock {
        self.server
            .mock("POST", "/v3/api/Auth/RequestToken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token":"tok-123","expiryDate":"2026-10-19T10:05:00Z","error":null,"status":"200","message":"Request processed successfully"}"#)
            .create_async()
            .await
    }

    pub async fn mock_auth_failure(&mut self) -> Mock {
        self.server
            .mock("POST", "/v3/api/Auth/RequestToken")
            .with_status(500)
            .with_body("upstream down")
            .create_async()
            .await
    }

    pub async fn mock_register_ipn(&mut self) -> Mock {
        self.server
            .mock("POST", "/v3/api/URLSetup/RegisterIPN")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"url":"{}","ipn_id":"ipn-42","error":null,"status":"200"}}"#,
                IPN_CALLBACK_URL
            ))
            .create_async()
            .await
    }

    pub async fn mock_submit_order(&mut self, order_tracking_id: &str) -> Mock {
        self.server
            .mock("POST", "/v3/api/Transactions/SubmitOrderRequest")
            .match_header("authorization", "Bearer tok-123")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "notification_id": "ipn-42",
                "currency": "TZS",
                "language": "EN"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"order_tracking_id":"{}","merchant_reference":"ref","redirect_url":"https://cybqa.pesapal.com/iframe","error":null,"status":"200"}}"#,
                order_tracking_id
            ))
            .create_async()
            .await
    }

    pub async fn mock_transaction_status(&mut self, order_tracking_id: &str, description: &str) -> Mock {
        self.server
            .mock(
                "GET",
                Matcher::Regex(r"^/v3/api/Transactions/GetTransactionStatus".to_string()),
            )
            .match_query(Matcher::UrlEncoded(
                "orderTrackingId".to_string(),
                order_tracking_id.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"payment_method":"Mpesa","amount":1000,"status_code_description":"{}","status_code":1,"error":null,"status":"200"}}"#,
                description
            ))
            .create_async()
            .await
    }

    pub async fn mock_transaction_status_failure(&mut self) -> Mock {
        self.server
            .mock(
                "GET",
                Matcher::Regex(r"^/v3/api/Transactions/GetTransactionStatus".to_string()),
            )
            .with_status(502)
            .create_async()
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    pub async fn make_payment(&self, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/make-payment")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn check_status(&self, tracking_id: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(format!("/api/check-status/{}", tracking_id))
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn notify(&self, query: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(format!("/api/pesapal-ipn-callback{}", query))
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8(bytes).unwrap())
    }
}
