//! Time Range Group API 模块 (商品可售时段)
//!
//! 餐厅维度的列表/创建挂在 `/api/restaurants/{id}/time-groups`。

mod handler;

use axum::{
    Router,
    routing::{delete, post, put},
};

use crate::core::ServerState;

pub use handler::{create_for_restaurant, list_for_restaurant};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/time-groups", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/products", post(handler::add_product))
        .route("/{id}/products/{product_id}", delete(handler::remove_product))
}
