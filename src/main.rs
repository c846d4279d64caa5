//! Storefront payments server.
//!
//! Loads configuration from `STOREFRONT_PAYMENTS__*` variables, connects to
//! PostgreSQL and serves the payment API until SIGINT/SIGTERM.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_payments::adapters::auth::{FirebaseConfig, FirebaseSessionValidator};
use storefront_payments::adapters::http::middleware::AuthState;
use storefront_payments::adapters::http::{payments_app, PaymentsAppState};
use storefront_payments::adapters::postgres::{
    PostgresPaymentRecordRepository, PostgresWebhookPaymentRepository,
};
use storefront_payments::adapters::razorpay::{RazorpayConfig, RazorpayGatewayAdapter};
use storefront_payments::application::retry::{BackoffExecutor, RetryPolicy};
use storefront_payments::config::{AppConfig, ConfigError, ServerConfig, ValidationError};
use storefront_payments::domain::payment::{PaymentSignatureVerifier, WebhookSignatureVerifier};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);

    if config.is_production() && config.payment.is_test_mode() {
        tracing::warn!("Running in production with a Razorpay test key");
    }

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    tracing::info!("Database connection pool initialized");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let gateway = RazorpayGatewayAdapter::new(
        RazorpayConfig::new(
            config.payment.razorpay_key_id.clone(),
            config.payment.razorpay_key_secret.clone(),
        )
        .with_base_url(config.payment.api_base_url.clone())
        .with_request_timeout(config.payment.gateway_timeout()),
    );

    let mut firebase = FirebaseConfig::new(config.auth.firebase_project_id.clone())
        .with_cache_duration(config.auth.jwks_cache_ttl());
    if let Some(url) = &config.auth.jwks_url {
        firebase = firebase.with_jwks_url(url.clone());
    }
    let auth: AuthState = Arc::new(FirebaseSessionValidator::new(firebase));

    let state = PaymentsAppState {
        gateway: Arc::new(gateway),
        payment_records: Arc::new(PostgresPaymentRecordRepository::new(pool.clone())),
        webhook_payments: Arc::new(PostgresWebhookPaymentRepository::new(pool.clone())),
        payment_verifier: PaymentSignatureVerifier::new(config.payment.razorpay_key_secret.clone()),
        webhook_verifier: WebhookSignatureVerifier::new(
            config.payment.razorpay_webhook_secret.clone(),
        ),
        executor: BackoffExecutor::with_policy(RetryPolicy::new(
            config.payment.retry_max_retries,
            config.payment.retry_initial_delay(),
        )),
        currency: config.payment.currency.clone(),
        redirect_origins: config.payment.redirect_origins_list(),
    };

    let app = with_layers(payments_app(state, auth), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        key_id = %config.payment.razorpay_key_id,
        "Storefront payments listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn with_layers(app: Router, server: &ServerConfig) -> Router {
    app.layer(cors_layer(server))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
