use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::pesapal::PesapalClient;
use crate::startup;
use crate::utils::sanitize::mask_str;

#[derive(Parser)]
#[command(name = "pesapal-bridge")]
#[command(about = "Pesapal Bridge - mobile-money payment relay", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print the effective configuration and validate it
    Config,

    /// Authenticate once against Pesapal with the configured credentials
    CheckProvider,
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Pesapal API URL: {}", config.pesapal_api_url);
    println!("  Consumer Key: {}", mask_str(&config.pesapal_consumer_key));
    println!("  Consumer Secret: ****");
    println!("  Public Base URL: {}", config.public_base_url);
    println!("  IPN Callback URL: {}", config.ipn_callback_url());
    println!("  Currency: {}", config.currency);
    println!("  Redirect URL: {}", config.redirect_url);
    println!("  Request Timeout: {}s", config.request_timeout_secs);

    let report = startup::validate_config(config);
    report.print();

    if !report.is_valid() {
        anyhow::bail!("Configuration is invalid");
    }

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");
    Ok(())
}

pub async fn handle_check_provider(config: &Config) -> anyhow::Result<()> {
    let client = PesapalClient::with_timeout(
        config.pesapal_api_url.clone(),
        config.credentials(),
        config.request_timeout(),
    );

    tracing::info!(url = %config.pesapal_api_url, "Checking Pesapal connectivity...");
    let report = startup::validate_environment(config, &client).await;
    report.print();

    if report.provider != Some(true) {
        anyhow::bail!("Pesapal authentication failed");
    }

    println!("✓ Pesapal accepted the configured credentials");
    Ok(())
}
