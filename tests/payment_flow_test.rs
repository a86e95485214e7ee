mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::setup_test_app;
use mockito::Matcher;
use pesapal_bridge::ports::TransactionRepository;
use serde_json::json;

#[tokio::test]
async fn test_full_payment_lifecycle() {
    let mut t = setup_test_app().await;
    let auth = t.mock_auth().await;
    let register = t.mock_register_ipn().await;
    let submit = t.mock_submit_order("pesapal-abc").await;
    let status = t.mock_transaction_status("pesapal-abc", "Completed").await;

    let (code, body) = t
        .make_payment(json!({"amount": 1000, "phone": "0700000000"}))
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Transaction initiated. Please check your phone to enter PIN."
    );
    let tracking_id = body["order_tracking_id"].as_str().unwrap().to_string();
    assert_ne!(tracking_id, "pesapal-abc");

    assert_eq!(t.repository.count().await.unwrap(), 1);
    let stored = t.repository.get_by_id(&tracking_id).await.unwrap();
    assert_eq!(stored.status, "Pending");
    assert_eq!(stored.provider_tracking_id, "pesapal-abc");

    let (code, body) = t.check_status(&tracking_id).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, json!({"payment_status": "Pending"}));

    let (code, ack) = t
        .notify(&format!(
            "?OrderTrackingId=pesapal-abc&OrderMerchantReference={}&OrderNotificationType=IPNCHANGE",
            tracking_id
        ))
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(
        ack,
        format!(
            "pesapal_notification_id=pesapal-abc&pesapal_tracking_id=pesapal-abc&pesapal_merchant_reference={}",
            tracking_id
        )
    );

    let (code, body) = t.check_status(&tracking_id).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, json!({"payment_status": "Completed"}));

    auth.assert_async().await;
    register.assert_async().await;
    submit.assert_async().await;
    status.assert_async().await;
}

#[tokio::test]
async fn test_submitted_order_references_internal_id() {
    let mut t = setup_test_app().await;
    let _auth = t.mock_auth().await;
    let _register = t.mock_register_ipn().await;
    let submit = t
        .server
        .mock("POST", "/v3/api/Transactions/SubmitOrderRequest")
        .match_body(Matcher::PartialJson(json!({
            "amount": 2500.5,
            "callback_url": "https://www.google.com/",
            "billing_address": {"phone_number": "0711111111"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"order_tracking_id":"pesapal-xyz","error":null,"status":"200"}"#)
        .create_async()
        .await;

    let (code, _) = t
        .make_payment(json!({"amount": 2500.5, "phone": "0711111111"}))
        .await;

    assert_eq!(code, StatusCode::OK);
    submit.assert_async().await;
}

#[tokio::test]
async fn test_missing_fields_make_no_outbound_calls() {
    let mut t = setup_test_app().await;
    let upstream = t
        .server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    for body in [
        json!({"phone": "0700000000"}),
        json!({"amount": 1000}),
        json!({"amount": 0, "phone": "0700000000"}),
        json!({"amount": 1000, "phone": ""}),
        json!({}),
    ] {
        let (code, response) = t.make_payment(body).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "Amount and Phone Number are required"}));
    }

    upstream.assert_async().await;
    assert_eq!(t.repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let t = setup_test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/make-payment")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();

    let (code, bytes) = t.send(request).await;
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Amount and Phone Number are required");
}

#[tokio::test]
async fn test_authentication_failure_returns_500() {
    let mut t = setup_test_app().await;
    let _auth = t.mock_auth_failure().await;
    let register = t
        .server
        .mock("POST", "/v3/api/URLSetup/RegisterIPN")
        .expect(0)
        .create_async()
        .await;

    let (code, body) = t
        .make_payment(json!({"amount": 1000, "phone": "0700000000"}))
        .await;

    assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Failed to authenticate with payment provider. Check your credentials."
    );
    register.assert_async().await;
    assert_eq!(t.repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_registration_failure_returns_500() {
    let mut t = setup_test_app().await;
    let _auth = t.mock_auth().await;
    let _register = t
        .server
        .mock("POST", "/v3/api/URLSetup/RegisterIPN")
        .with_status(400)
        .with_body("bad url")
        .create_async()
        .await;

    let (code, body) = t
        .make_payment(json!({"amount": 1000, "phone": "0700000000"}))
        .await;

    assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Failed to register notification URL. Check your public domain configuration."
    );
}

#[tokio::test]
async fn test_rejected_order_returns_500_with_detail() {
    let mut t = setup_test_app().await;
    let _auth = t.mock_auth().await;
    let _register = t.mock_register_ipn().await;
    let _submit = t
        .server
        .mock("POST", "/v3/api/Transactions/SubmitOrderRequest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"order_tracking_id":null,"error":{"error_type":"api_error","code":"invalid_amount","message":"Invalid amount"},"status":"500"}"#)
        .create_async()
        .await;

    let (code, body) = t
        .make_payment(json!({"amount": 1000, "phone": "0700000000"}))
        .await;

    assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Payment initiation failed: Invalid amount");
    assert_eq!(t.repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_rejected_order_with_empty_message_reports_code() {
    let mut t = setup_test_app().await;
    let _auth = t.mock_auth().await;
    let _register = t.mock_register_ipn().await;
    let _submit = t
        .server
        .mock("POST", "/v3/api/Transactions/SubmitOrderRequest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"error_type":"api_error","code":"invalid_phone_number","message":""}}"#)
        .create_async()
        .await;

    let (code, body) = t
        .make_payment(json!({"amount": 1000, "phone": "0700000000"}))
        .await;

    assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Payment initiation failed: invalid_phone_number");
    assert_eq!(t.repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_check_status_unknown_id() {
    let mut t = setup_test_app().await;
    let _auth = t.mock_auth().await;
    let _register = t.mock_register_ipn().await;
    let _submit = t.mock_submit_order("pesapal-abc").await;
    t.make_payment(json!({"amount": 1000, "phone": "0700000000"}))
        .await;

    for id in ["does-not-exist", "pesapal-abc"] {
        let (code, body) = t.check_status(id).await;
        assert_eq!(code, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"payment_status": "Invalid"}));
    }
}

#[tokio::test]
async fn test_metrics_track_initiations() {
    let mut t = setup_test_app().await;
    let _auth = t.mock_auth().await;
    let _register = t.mock_register_ipn().await;
    let _submit = t.mock_submit_order("pesapal-abc").await;

    t.make_payment(json!({"amount": 1000, "phone": "0700000000"}))
        .await;
    t.make_payment(json!({"amount": 500, "phone": "0700000001"}))
        .await;

    assert_eq!(t.state.metrics.snapshot().payments_initiated, 2);
}
