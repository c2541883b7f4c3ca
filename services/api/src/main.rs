//! API Service - Campaign sync and dashboard data for the agency portal
//!
//! Endpoints:
//! - GET  /health - Health check
//! - POST /functions/sync-google-sheets - Replace a dashboard's rows from its spreadsheet (admin key)
//! - GET  /dashboards/:dashboard_id/campaigns - Campaign rows for the customer dashboard
//! - GET  /dashboards/:dashboard_id/summary - Totals and derived metrics

mod auth;
mod error;
mod handlers;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use collector::{PgStore, SheetFetcher};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use handlers::{campaigns_handler, health_handler, summary_handler, sync_handler};

// ============================================================================
// State
// ============================================================================

pub struct AppState {
    pub store: PgStore,
    pub fetcher: SheetFetcher,
    pub admin_key: Option<String>,
    pub production: bool,
}

#[derive(Debug, Clone)]
struct Config {
    sync: collector::Config,
    bind: String,
    admin_key: Option<String>,
    production: bool,
}

impl Config {
    fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            sync: collector::Config::from_env()?,
            bind: std::env::var("API_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            admin_key: std::env::var("ADMIN_API_KEY").ok().filter(|k| !k.is_empty()),
            production: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
                == "production",
        })
    }
}

fn router(state: Arc<AppState>) -> Router {
    // CORS for the portal front-end
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin = Router::new()
        .route("/functions/sync-google-sheets", post(sync_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_key,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/dashboards/:dashboard_id/campaigns", get(campaigns_handler))
        .route("/dashboards/:dashboard_id/summary", get(summary_handler))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("connecting to database");
    let store = PgStore::connect(config.sync.require_db_url()?, 10)
        .await
        .context("Failed to connect to database")?;

    let fetcher = SheetFetcher::new(config.sync.http_client()?, config.sync.sheets_base_url.clone());

    if config.admin_key.is_none() {
        tracing::warn!(production = config.production, "ADMIN_API_KEY is not set");
    }

    let state = Arc::new(AppState {
        store,
        fetcher,
        admin_key: config.admin_key,
        production: config.production,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(bind = %config.bind, "API listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
