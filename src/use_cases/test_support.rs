//! Scriptable gateway for exercising the use cases without a network.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::pesapal::{
    AccessToken, GatewayError, PaymentGateway, ProviderError, SubmitOrderRequest,
    SubmitOrderResponse, TransactionStatus,
};

#[derive(Debug, Clone)]
pub(crate) enum SubmitBehaviour {
    Accept(String),
    Reject(String),
    Fail,
    MissingTrackingId,
}

pub(crate) struct StubGateway {
    pub auth_ok: bool,
    pub register_ok: bool,
    pub submit: SubmitBehaviour,
    /// `None` makes the status query fail.
    pub status: Mutex<Option<String>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub last_order: Mutex<Option<SubmitOrderRequest>>,
    pub last_queried: Mutex<Option<String>>,
}

impl StubGateway {
    pub fn accepting(provider_tracking_id: &str) -> Self {
        Self {
            auth_ok: true,
            register_ok: true,
            submit: SubmitBehaviour::Accept(provider_tracking_id.to_string()),
            status: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            last_order: Mutex::new(None),
            last_queried: Mutex::new(None),
        }
    }

    pub fn with_status(self, status: &str) -> Self {
        *self.status.lock().unwrap() = Some(status.to_string());
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

fn upstream_failure() -> GatewayError {
    GatewayError::Status {
        status: 500,
        body: "stub failure".to_string(),
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn authenticate(&self) -> Result<AccessToken, GatewayError> {
        self.record("authenticate");
        if self.auth_ok {
            Ok(AccessToken::new("stub-token"))
        } else {
            Err(GatewayError::PlaceholderCredentials)
        }
    }

    async fn register_ipn(
        &self,
        _token: &AccessToken,
        callback_url: &str,
    ) -> Result<String, GatewayError> {
        self.record("register_ipn");
        if self.register_ok {
            Ok("stub-ipn".to_string())
        } else {
            Err(GatewayError::PlaceholderCallbackUrl(callback_url.to_string()))
        }
    }

    async fn submit_order(
        &self,
        _token: &AccessToken,
        order: &SubmitOrderRequest,
    ) -> Result<SubmitOrderResponse, GatewayError> {
        self.record("submit_order");
        *self.last_order.lock().unwrap() = Some(order.clone());

        let response = |order_tracking_id: Option<String>, error: Option<ProviderError>| {
            SubmitOrderResponse {
                order_tracking_id,
                merchant_reference: Some(order.id.clone()),
                redirect_url: None,
                error,
                status: Some("200".to_string()),
            }
        };

        match &self.submit {
            SubmitBehaviour::Accept(id) => Ok(response(Some(id.clone()), None)),
            SubmitBehaviour::Reject(message) => Ok(response(
                None,
                Some(ProviderError::Message(message.clone())),
            )),
            SubmitBehaviour::Fail => Err(upstream_failure()),
            SubmitBehaviour::MissingTrackingId => Ok(response(None, None)),
        }
    }

    async fn query_status(
        &self,
        _token: &AccessToken,
        order_tracking_id: &str,
    ) -> Result<TransactionStatus, GatewayError> {
        self.record("query_status");
        *self.last_queried.lock().unwrap() = Some(order_tracking_id.to_string());

        match self.status.lock().unwrap().clone() {
            Some(description) => Ok(TransactionStatus {
                payment_method: Some("Mpesa".to_string()),
                confirmation_code: None,
                merchant_reference: None,
                status_code_description: Some(description),
                payment_status_description: None,
                error: None,
            }),
            None => Err(upstream_failure()),
        }
    }
}
