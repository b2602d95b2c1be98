//! # Backend
//!
//! Bookkeeping service for a neighborhood association (RT): the cash ledger,
//! per-resident dues arrears and the arisan lottery.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, sessions)
//!     ↓
//! Domain Layer (services and pure aggregation / draw logic)
//!     ↓
//! Storage Layer (RecordStore over CSV tables or memory)
//! ```
//!
//! All persistent state lives in the record store tables. The only other
//! in-process state is the session registry.

pub mod config;
pub mod domain;
pub mod errors;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use config::AppConfig;
use domain::{
    ArrearsService, CategoryService, ExportService, LedgerService, LotteryService,
    Sha256Verifier, UserService,
};
use io::rest::{
    arrears_apis, auth_apis, category_apis, export_apis, ledger_apis, lottery_apis,
    transaction_apis, user_apis, SessionRegistry,
};
use std::sync::Arc;
use std::time::Duration;
use storage::{CsvConnection, CsvRecordStore, RecordStore};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub category_service: CategoryService,
    pub ledger_service: LedgerService,
    pub arrears_service: ArrearsService,
    pub lottery_service: LotteryService,
    pub export_service: ExportService,
    pub sessions: SessionRegistry,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire every service to one record store
    pub fn new(store: Arc<dyn RecordStore>, config: AppConfig) -> Self {
        Self {
            user_service: UserService::new(Arc::clone(&store), Arc::new(Sha256Verifier)),
            category_service: CategoryService::new(Arc::clone(&store)),
            ledger_service: LedgerService::new(Arc::clone(&store)),
            arrears_service: ArrearsService::new(Arc::clone(&store)),
            lottery_service: LotteryService::new(store, config.lottery_seed),
            export_service: ExportService::new(),
            sessions: SessionRegistry::with_idle_timeout(Duration::from_secs(
                config.session_idle_minutes.saturating_mul(60),
            )),
            config: Arc::new(config),
        }
    }
}

/// Initialize the backend over the CSV data directory
pub async fn initialize_backend(config: AppConfig) -> Result<AppState> {
    info!("Setting up CSV storage in {}", config.data_dir.display());
    let connection = CsvConnection::new(&config.data_dir)
        .with_context(|| format!("cannot open data directory {}", config.data_dir.display()))?;
    let store: Arc<dyn RecordStore> = Arc::new(CsvRecordStore::new(connection));

    info!("Setting up domain services");
    let app_state = AppState::new(store, config);

    if app_state.config.seed_admin_on_start {
        match app_state
            .user_service
            .ensure_seed_admin(&app_state.config.seed_admin)
            .await
        {
            Ok(true) => info!("Created seed admin '{}'", app_state.config.seed_admin.username),
            Ok(false) => info!("Users present, seed admin not needed"),
            Err(e) => warn!("Could not seed admin user: {}", e),
        }
    }

    Ok(app_state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let cors = match app_state
        .config
        .cors_origin
        .as_deref()
        .map(str::parse::<HeaderValue>)
    {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS origin: {}", e);
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    };

    let api_routes = Router::new()
        .nest("/auth", auth_apis::router())
        .nest("/users", user_apis::router())
        .nest("/categories", category_apis::router())
        .nest("/transactions", transaction_apis::router())
        .nest("/ledger", ledger_apis::router())
        .nest("/arrears", arrears_apis::router())
        .nest("/lottery", lottery_apis::router())
        .nest("/export", export_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
