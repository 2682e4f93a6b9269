//! Order API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use shared::models::{Order, OrderCreate, OrderUpdate};
use shared::util::now_millis;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders;
use crate::utils::AppResult;

/// POST /api/orders - 下单 (默认归属当前员工)
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = orders::create(&state.pool, &current_user, payload, now_millis()).await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id - 修改未结账订单
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<Order>> {
    Ok(Json(orders::update(&state.pool, id, payload, now_millis()).await?))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(orders::get(&state.pool, id).await?))
}

/// GET /api/orders - 当前营业日订单
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(orders::list(&state.pool).await?))
}
