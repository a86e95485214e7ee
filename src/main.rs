use clap::Parser;
use pesapal_bridge::adapters::InMemoryTransactionRepository;
use pesapal_bridge::cli::{self, Cli, Commands};
use pesapal_bridge::config::{Config, LogFormat};
use pesapal_bridge::pesapal::PesapalClient;
use pesapal_bridge::{create_app_with, startup, AppState, HttpOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Config => cli::handle_config_validate(&config),
        Commands::CheckProvider => cli::handle_check_provider(&config).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let report = startup::validate_config(&config);
    for error in &report.errors {
        tracing::warn!("Configuration problem: {}", error);
    }

    let gateway = PesapalClient::with_timeout(
        config.pesapal_api_url.clone(),
        config.credentials(),
        config.request_timeout(),
    );
    tracing::info!(
        "Pesapal client initialized with URL: {}",
        config.pesapal_api_url
    );

    // Process-lifetime store; records are lost on restart.
    let repository = Arc::new(InMemoryTransactionRepository::new());

    let state = AppState::new(Arc::new(gateway), repository, config.order_settings());
    let app = create_app_with(
        state,
        HttpOptions {
            allowed_origins: config.cors_allowed_origins.clone(),
            log_request_body: config.log_request_body,
        },
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);
    tracing::info!("IPN callback URL: {}", config.ipn_callback_url());

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
