//! Receipt API Module

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/receipts", routes())
}

fn routes() -> Router<ServerState> {
    // 收银为基础操作，登录即可
    Router::new()
        .route("/", get(handler::list).post(handler::checkout))
        .route("/range", get(handler::range))
        .route("/{id}", put(handler::update).get(handler::get_by_id))
}
