//! Gains Tracker Backend
//!
//! Serves the nutrition and metric read models over HTTP.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Read models and business logic
//! - Repositories: Document store access
//! - Providers: Health data and workout classifier collaborators

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use gains_tracker_backend::{
    config::{self, AppConfig},
    db,
    providers::{Classifier, DisabledClassifier, HttpClassifier, InMemoryHealthProvider},
    repositories::{DocumentStore, InMemoryDocumentStore, PgDocumentStore, ProfileRepository},
    routes,
    state::AppState,
};
use gains_tracker_shared::derive_targets;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        user_id = %config.session.user_id,
        "Starting Gains Tracker Backend"
    );

    if config.metrics.enabled {
        install_metrics_exporter(config.metrics.port)?;
    }

    let store = connect_store(&config).await?;
    let classifier = build_classifier(&config)?;
    let provider = Arc::new(InMemoryHealthProvider::new());

    // Create application state
    let state = AppState::new(config.clone(), store, provider, classifier);
    warm_up(&state).await;

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "gains_tracker_backend=info,tower_http=info".into()
        } else {
            "gains_tracker_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Prometheus scrape endpoint on its own port
fn install_metrics_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Postgres document store when enabled, in-memory otherwise
async fn connect_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    if !config.database.enabled {
        warn!("Database disabled; documents are kept in memory and lost on exit");
        return Ok(Arc::new(InMemoryDocumentStore::new()));
    }

    info!("Connecting to database...");
    let pool = db::connect(&config.database).await?;
    Ok(Arc::new(PgDocumentStore::new(pool)))
}

fn build_classifier(config: &AppConfig) -> Result<Arc<dyn Classifier>> {
    let recommender = &config.recommender;
    if !recommender.enabled {
        info!("Workout classifier disabled; recommendations will show placeholders");
        return Ok(Arc::new(DisabledClassifier));
    }

    let classifier = HttpClassifier::new(
        recommender.endpoint.clone(),
        Duration::from_secs(recommender.timeout_secs),
    )
    .context("Failed to build classifier client")?;
    info!(endpoint = %recommender.endpoint, "Workout classifier configured");
    Ok(Arc::new(classifier))
}

/// Load the read models once before serving
async fn warm_up(state: &AppState) {
    match ProfileRepository::find(state.store(), state.user_id()).await {
        Ok(Some(profile)) => {
            let targets = derive_targets(&profile);
            info!(
                target_calories = targets.target_calories,
                target_calories_burned = targets.target_calories_burned,
                "Profile loaded"
            );
        }
        Ok(None) => info!("No profile yet; onboarding required"),
        Err(e) => warn!(error = %e, "Could not load profile"),
    }

    if state.config().health.observe_changes {
        state.health.spawn_observer();
    }

    if let Err(e) = state.meals.refresh().await {
        warn!(error = %e, "Initial meal load failed");
    }
    if !state.health.refresh_all().await {
        warn!("Initial health refresh incomplete");
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
