use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::pesapal::PesapalCredentials;
use crate::use_cases::OrderSettings;

pub const IPN_CALLBACK_PATH: &str = "/api/pesapal-ipn-callback";

const DEFAULT_SERVER_PORT: u16 = 5000;
const DEFAULT_PESAPAL_API_URL: &str = "https://cybqa.pesapal.com";
const DEFAULT_CURRENCY: &str = "TZS";
const DEFAULT_REDIRECT_URL: &str = "https://www.google.com/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_port: u16,
    pub pesapal_consumer_key: String,
    pub pesapal_consumer_secret: String,
    /// Sandbox (`https://cybqa.pesapal.com`) or live (`https://pay.pesapal.com`).
    pub pesapal_api_url: String,
    /// This service's own public base URL; Pesapal must reach it over https.
    pub public_base_url: String,
    pub currency: String,
    pub redirect_url: String,
    pub request_timeout_secs: u64,
    pub cors_allowed_origins: AllowedOrigins,
    pub log_request_body: bool,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} must be set", key))
        };

        Ok(Config {
            server_port: match lookup("SERVER_PORT") {
                Some(port) => port.trim().parse().context("SERVER_PORT must be a port number")?,
                None => DEFAULT_SERVER_PORT,
            },
            pesapal_consumer_key: required("PESAPAL_CONSUMER_KEY")?,
            pesapal_consumer_secret: required("PESAPAL_CONSUMER_SECRET")?,
            pesapal_api_url: lookup("PESAPAL_API_URL")
                .unwrap_or_else(|| DEFAULT_PESAPAL_API_URL.to_string()),
            public_base_url: required("PUBLIC_BASE_URL")?,
            currency: lookup("PESAPAL_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            redirect_url: lookup("PAYMENT_REDIRECT_URL")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string()),
            request_timeout_secs: match lookup("PESAPAL_REQUEST_TIMEOUT_SECS") {
                Some(secs) => secs
                    .trim()
                    .parse()
                    .context("PESAPAL_REQUEST_TIMEOUT_SECS must be a number of seconds")?,
                None => DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            cors_allowed_origins: parse_allowed_origins(
                &lookup("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
            )?,
            log_request_body: lookup("LOG_REQUEST_BODY")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            log_format: LogFormat::parse(&lookup("LOG_FORMAT").unwrap_or_default()),
        })
    }

    pub fn ipn_callback_url(&self) -> String {
        format!(
            "{}{}",
            self.public_base_url.trim_end_matches('/'),
            IPN_CALLBACK_PATH
        )
    }

    pub fn credentials(&self) -> PesapalCredentials {
        PesapalCredentials::new(&self.pesapal_consumer_key, &self.pesapal_consumer_secret)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn order_settings(&self) -> OrderSettings {
        OrderSettings {
            ipn_callback_url: self.ipn_callback_url(),
            currency: self.currency.clone(),
            redirect_url: self.redirect_url.clone(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_port", &self.server_port)
            .field("credentials", &self.credentials())
            .field("pesapal_api_url", &self.pesapal_api_url)
            .field("public_base_url", &self.public_base_url)
            .field("currency", &self.currency)
            .field("redirect_url", &self.redirect_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("log_request_body", &self.log_request_body)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_allowed_origins(raw: &str) -> Result<AllowedOrigins> {
    let value = raw.trim();
    if value == "*" {
        return Ok(AllowedOrigins::Any);
    }

    let origins = value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            url::Url::parse(entry)
                .map(|_| entry.trim_end_matches('/').to_string())
                .with_context(|| format!("invalid CORS origin '{}'", entry))
        })
        .collect::<Result<Vec<_>>>()?;

    if origins.is_empty() {
        anyhow::bail!("CORS_ALLOWED_ORIGINS must be '*' or a comma-separated list of origins");
    }

    Ok(AllowedOrigins::List(origins))
}
