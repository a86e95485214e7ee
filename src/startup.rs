use crate::config::Config;
use crate::pesapal::{is_placeholder_credential, is_placeholder_url, PaymentGateway};
use anyhow::{Context, Result};

pub struct ValidationReport {
    pub environment: bool,
    pub provider: Option<bool>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.environment && self.provider.unwrap_or(true)
    }

    pub fn print(&self) {
        println!("\n=== Startup Validation Report ===");
        println!("Environment Variables: {}", status(self.environment));
        match self.provider {
            Some(ok) => println!("Pesapal Connectivity:  {}", status(ok)),
            None => println!("Pesapal Connectivity:  skipped"),
        }

        if !self.errors.is_empty() {
            println!("\nErrors:");
            for error in &self.errors {
                println!("  ❌ {}", error);
            }
        }

        println!("\nOverall Status: {}", if self.is_valid() { "✅ PASS" } else { "❌ FAIL" });
        println!("=================================\n");
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "✅ OK" } else { "❌ FAIL" }
}

/// Checks configuration only; no network calls.
pub fn validate_config(config: &Config) -> ValidationReport {
    let errors = config_errors(config);
    ValidationReport {
        environment: errors.is_empty(),
        provider: None,
        errors,
    }
}

/// Checks configuration, then authenticates once against the provider.
pub async fn validate_environment(config: &Config, gateway: &dyn PaymentGateway) -> ValidationReport {
    let mut report = validate_config(config);

    match gateway.authenticate().await {
        Ok(_) => report.provider = Some(true),
        Err(e) => {
            report.provider = Some(false);
            report.errors.push(format!("Pesapal: {}", e));
        }
    }

    report
}

fn config_errors(config: &Config) -> Vec<String> {
    let mut errors = Vec::new();

    if config.server_port == 0 {
        errors.push("SERVER_PORT must be greater than 0".to_string());
    }
    if config.request_timeout_secs == 0 {
        errors.push("PESAPAL_REQUEST_TIMEOUT_SECS must be greater than 0".to_string());
    }
    if is_placeholder_credential(&config.pesapal_consumer_key)
        || is_placeholder_credential(&config.pesapal_consumer_secret)
    {
        errors.push("PESAPAL_CONSUMER_KEY / PESAPAL_CONSUMER_SECRET are placeholders".to_string());
    }
    if let Err(e) = validate_url("PESAPAL_API_URL", &config.pesapal_api_url) {
        errors.push(format!("{:#}", e));
    }
    if let Err(e) = validate_public_base_url(&config.public_base_url) {
        errors.push(format!("{:#}", e));
    }
    if let Err(e) = validate_url("PAYMENT_REDIRECT_URL", &config.redirect_url) {
        errors.push(format!("{:#}", e));
    }

    errors
}

fn validate_url(name: &str, value: &str) -> Result<url::Url> {
    url::Url::parse(value).with_context(|| format!("{} is not a valid URL", name))
}

fn validate_public_base_url(value: &str) -> Result<()> {
    if is_placeholder_url(value) {
        anyhow::bail!("PUBLIC_BASE_URL is a placeholder; IPN registration will fail");
    }
    let url = validate_url("PUBLIC_BASE_URL", value)?;
    if url.scheme() != "https" {
        anyhow::bail!("PUBLIC_BASE_URL must use https for Pesapal to deliver notifications");
    }
    Ok(())
}
