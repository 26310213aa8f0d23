//! Brasserie server library logic.

pub mod config;
pub mod error;
pub mod pages;

use axum::{
    routing::get,
    Extension, Json, Router,
};
use brasserie_db::DbPool;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
///
/// The pool is the only shared process-wide state. There is no in-process
/// caching and no background work; each request takes a connection for the
/// duration of its model calls and nothing else.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
}

/// Health check handler.
///
/// Returns `200 OK` with server status and version. Used by monitoring and
/// CI to verify the server is running.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(pages::customer_list_page))
        .route("/search", get(pages::customer_search_page))
        .route("/top", get(pages::top_customers_page))
        .route(
            "/customers/new",
            get(pages::new_customer_page).post(pages::create_customer_handler),
        )
        .route("/customers/{id}", get(pages::customer_detail_page))
        .route(
            "/customers/{id}/edit",
            get(pages::edit_customer_page).post(pages::update_customer_handler),
        )
        .route(
            "/customers/{id}/reservations",
            axum::routing::post(pages::create_reservation_handler),
        )
        .fallback(pages::not_found_page)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
