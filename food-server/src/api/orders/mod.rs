//! Order API Module
//!
//! All status changes go through `OrderLifecycle`.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", put(handler::update_status))
}
