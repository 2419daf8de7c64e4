//! SynapseLab Checkout - signup API
//!
//! Serves `POST /api/checkout`: registers an organization with its administrator
//! and sends the welcome notification.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use synapse_checkout::api::{self, AppState};
use synapse_checkout::domain::BcryptHasher;
use synapse_checkout::notify::{EmailNotifier, FanoutNotifier, WhatsAppNotifier};
use synapse_checkout::store::PgDirectoryStore;
use synapse_checkout::{db, Config, SignupHandler, SignupSettings};

/// Initialize tracing/logging
fn init_tracing(config: &Config) {
    let default_filter = if config.is_production() {
        "synapse_checkout=info,tower_http=info"
    } else {
        "synapse_checkout=debug,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Assemble the configured notification channels
fn build_notifier(config: &Config) -> anyhow::Result<FanoutNotifier> {
    let mut notifier = FanoutNotifier::new();

    match &config.email {
        Some(email) => {
            notifier = notifier.with_channel(Arc::new(EmailNotifier::new(
                email,
                config.notify_timeout,
            )?));
            tracing::info!(smtp_host = %email.smtp_host, "Email notifications enabled");
        }
        None => tracing::warn!("EMAIL_USER/EMAIL_PASS not set; welcome emails disabled"),
    }

    if let Some(whatsapp) = &config.whatsapp {
        notifier = notifier.with_channel(Arc::new(WhatsAppNotifier::new(
            whatsapp,
            config.notify_timeout,
        )?));
        tracing::info!("WhatsApp notifications enabled");
    }

    Ok(notifier)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(environment = %config.environment, "Starting SynapseLab checkout");
    tracing::info!("Connecting to database...");

    // Create database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.store_timeout)
        .connect(&config.database_url)
        .await?;

    db::verify_connection(&pool).await?;

    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");

    let notifier = build_notifier(&config)?;
    let handler = SignupHandler::new(
        Arc::new(PgDirectoryStore::new(pool.clone())),
        Arc::new(BcryptHasher::new(config.bcrypt_cost)),
        Arc::new(notifier),
        SignupSettings::from(&config),
    );

    let app = api::app(AppState::new(handler), config.public_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
