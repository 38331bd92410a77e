//! # Studio Backend
//!
//! Backend of the studio manager: students, class sessions, payments, plans
//! and billing alerts, exposed as a REST API.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers, access extraction)
//!     ↓
//! Domain Layer (services, alert engine, message composer)
//!     ↓
//! Storage Layer (Store over a BlobStore: sqlite, json files, memory)
//! ```
//!
//! [`initialize_backend`] wires the layers from a [`StudioConfig`] and
//! [`create_router`] builds the axum router over the resulting [`AppState`].

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{header::HeaderName, HeaderValue, Method},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::{StorageBackend, StudioConfig};
use crate::domain::{
    DashboardService, MessageService, PaymentService, PlanService, ScheduleService, StudentService,
};
use crate::storage::{BlobStore, DbConnection, JsonFileConnection, Store};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub student_service: StudentService,
    pub payment_service: PaymentService,
    pub plan_service: PlanService,
    pub schedule_service: ScheduleService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(store: Store, messages: MessageService, public_url: &str) -> Self {
        Self {
            student_service: StudentService::new(store.clone(), messages.clone(), public_url),
            payment_service: PaymentService::new(store.clone(), messages.clone()),
            plan_service: PlanService::new(store.clone()),
            schedule_service: ScheduleService::new(store.clone(), messages),
            dashboard_service: DashboardService::new(store),
        }
    }
}

/// Open the blob store selected in the config
pub async fn open_blob_store(config: &StudioConfig) -> Result<Arc<dyn BlobStore>> {
    let blobs: Arc<dyn BlobStore> = match config.storage {
        StorageBackend::Sqlite => Arc::new(DbConnection::init(&config.data_directory).await?),
        StorageBackend::Json => Arc::new(JsonFileConnection::new(&config.data_directory)?),
    };
    Ok(blobs)
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &StudioConfig) -> Result<AppState> {
    info!("Setting up {:?} storage in {}", config.storage, config.data_directory.display());
    let blobs = open_blob_store(config).await?;

    info!("Loading studio data");
    let store = Store::open(blobs, config.initial_plans.clone())
        .await
        .context("Failed to load studio data")?;

    info!("Setting up domain services");
    let messages = MessageService::from_settings(&config.ai, config.studio.clone());

    Ok(AppState::new(store, messages, &config.studio.public_url))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &StudioConfig) -> Result<Router> {
    let origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid allowed_origin '{}'", config.allowed_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(io::rest::STUDENT_ID_HEADER)]);

    let mut router = Router::new().nest("/api", api_router());
    if let Some(directory) = &config.static_directory {
        info!("Serving client files from {}", directory.display());
        router = router.fallback_service(ServeDir::new(directory));
    }

    Ok(router.layer(cors).with_state(app_state))
}

/// The `/api` routes, without state
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/alerts", io::rest::alert_apis::router())
        .nest("/dashboard", io::rest::dashboard_apis::router())
        .merge(io::rest::access_apis::router())
        .nest("/students", io::rest::student_apis::router())
        .nest("/payments", io::rest::payment_apis::router())
        .nest("/plans", io::rest::plan_apis::router())
        .nest("/classes", io::rest::class_apis::router())
        .nest("/logs", io::rest::logging_apis::router())
}
