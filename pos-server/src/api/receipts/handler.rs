//! Receipt API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Receipt, ReceiptCreate, ReceiptUpdate, ReceiptWithOrder};
use shared::util::now_millis;

use crate::api::required;
use crate::core::ServerState;
use crate::receipts;
use crate::utils::AppResult;
use crate::utils::time::parse_range_bound;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// POST /api/receipts - 结账
pub async fn checkout(
    State(state): State<ServerState>,
    Json(payload): Json<ReceiptCreate>,
) -> AppResult<Json<Receipt>> {
    let receipt =
        receipts::checkout(&state.pool, state.catalog.as_ref(), payload, now_millis()).await?;
    Ok(Json(receipt))
}

/// PUT /api/receipts/:id - 修改支付信息
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReceiptUpdate>,
) -> AppResult<Json<ReceiptWithOrder>> {
    Ok(Json(
        receipts::update(&state.pool, id, payload, now_millis()).await?,
    ))
}

/// GET /api/receipts/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReceiptWithOrder>> {
    Ok(Json(receipts::get(&state.pool, id).await?))
}

/// GET /api/receipts - 当前营业日的小票
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ReceiptWithOrder>>> {
    Ok(Json(receipts::list_live(&state.pool).await?))
}

/// GET /api/receipts/range?startDate&endDate - 含已归档小票
///
/// 区间内没有小票时返回 200 和空数组，而不是 404。
pub async fn range(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<ReceiptWithOrder>>> {
    let tz = state.config.timezone;
    let start_raw = required(query.start_date, "startDate")?;
    let end_raw = required(query.end_date, "endDate")?;
    let start = parse_range_bound(&start_raw, "startDate", false, tz)?;
    let end = parse_range_bound(&end_raw, "endDate", true, tz)?;

    Ok(Json(receipts::find_in_range(&state.pool, start, end).await?))
}
