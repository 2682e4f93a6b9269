//! EoD API 模块 (日结)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::{REPORTS_GENERATE, REPORTS_VIEW};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/eod", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/date", get(handler::get_by_date))
        .route("/summary", get(handler::summary))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(REPORTS_VIEW)));

    let close_routes = Router::new()
        .route("/", post(handler::generate))
        .route("/resume", post(handler::resume))
        .layer(middleware::from_fn(require_permission(REPORTS_GENERATE)));

    read_routes.merge(close_routes)
}
