//! Bike Shop API Library
//!
//! Work order management for a bike repair shop: routes, services, storage
//! and the ambient HTTP stack around them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use crate::auth::{AuthRouterExt, AuthService};
use crate::repositories::WorkOrderRepository;
use crate::services::work_orders::WorkOrderService;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub work_orders: Arc<WorkOrderService>,
}

impl AppState {
    /// Wires the SeaORM backed store into the work order service
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let store = Arc::new(WorkOrderRepository::new(db.clone()));
        Self {
            db,
            config,
            work_orders: Arc::new(WorkOrderService::new(store)),
        }
    }

    pub fn work_order_service(&self) -> Arc<WorkOrderService> {
        self.work_orders.clone()
    }
}

/// Versioned API routes; every work order route requires a bearer token
pub fn api_v1_routes() -> Router<AppState> {
    Router::new().nest(
        "/work-orders",
        handlers::work_orders::work_order_routes().with_auth(),
    )
}

/// Assembles the full HTTP application around `state`
pub fn build_router(state: AppState, auth_service: Arc<AuthService>, cors: CorsLayer) -> Router {
    let db = state.db.clone();

    Router::<AppState>::new()
        .route("/", get(|| async { "bikeshop-api up" }))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .with_state(state)
        .nest("/health", health::health_routes(db))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
             mut req: axum::extract::Request,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
}
