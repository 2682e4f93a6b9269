//! Time Ledger API 模块 (员工工时)
//!
//! 员工只能记录/查看自己的工时，`shifts:manage` 可代他人操作。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::SHIFTS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/time-ledger", routes())
}

fn routes() -> Router<ServerState> {
    let self_routes = Router::new()
        .route("/{employee_id}/open", post(handler::open))
        .route("/{employee_id}/close", post(handler::close))
        .route("/{employee_id}/months/{year}/{month}", get(handler::get_month))
        .route("/{employee_id}/recent", get(handler::recent));

    let manage_routes = Router::new()
        .route("/force-close", post(handler::force_close))
        .layer(middleware::from_fn(require_permission(SHIFTS_MANAGE)));

    self_routes.merge(manage_routes)
}
