//! HTTP layer - router, shared state, and request handlers.
//!
//! This module provides the HTTP interface for the product service: the
//! `/products` resource, the correlation middleware that tags every request
//! with a random id, and the state handed to each handler.

/// Per-request correlation ids and the logging middleware around them
pub mod middleware;
/// Handlers for the `/products` resource
pub mod products;

use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use middleware::{RequestId, RequestIdGenerator};

/// Path the products resource is served under.
pub const PRODUCTS_PATH: &str = "/products";

/// Shared data available to all handlers.
///
/// Holds the one long-lived store connection every request works against.
/// Cloning is cheap; the connection is pooled internally.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection for all storage operations
    pub database: DatabaseConnection,
}

impl AppState {
    /// Creates a new `AppState` around an open database connection.
    #[must_use]
    pub const fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// Builds the application router with a clock-seeded correlation id generator.
pub fn router(state: AppState) -> Router {
    router_with_request_ids(state, Arc::new(RequestIdGenerator::from_clock()))
}

/// Builds the application router around a caller-supplied id generator.
///
/// The correlation middleware sits outermost so that everything beneath it,
/// HTTP tracing included, runs inside the request's span.
pub fn router_with_request_ids(state: AppState, request_ids: Arc<RequestIdGenerator>) -> Router {
    Router::new()
        .route(
            PRODUCTS_PATH,
            get(products::get_products)
                .post(products::post_product)
                .put(products::put_product)
                .delete(products::delete_product),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    request_ids,
                    middleware::correlate,
                ))
                .layer(TraceLayer::new_for_http()),
        )
}
