//! Time Ledger API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use shared::models::{
    ClosedSession, ForceCloseOutcome, MonthSummary, RecentQuery, RecentTotal, ShiftEvent,
    ShiftInterval,
};
use shared::util::now_millis;

use crate::auth::permissions::SHIFTS_MANAGE;
use crate::auth::{CurrentUser, ensure_self_or_permission};
use crate::core::ServerState;
use crate::shifts::{close_all_open_sessions, ledger};
use crate::utils::{ApiResponse, AppResult};

fn event_time(body: Option<Json<ShiftEvent>>) -> i64 {
    body.and_then(|Json(event)| event.at).unwrap_or_else(now_millis)
}

/// POST /api/time-ledger/:employee_id/open - 上班
pub async fn open(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(employee_id): Path<String>,
    body: Option<Json<ShiftEvent>>,
) -> AppResult<Json<ShiftInterval>> {
    ensure_self_or_permission(&current_user, &employee_id, SHIFTS_MANAGE)?;
    let interval = state
        .shifts
        .open_interval(&employee_id, event_time(body))
        .await?;
    Ok(Json(interval))
}

/// POST /api/time-ledger/:employee_id/close - 下班
pub async fn close(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(employee_id): Path<String>,
    body: Option<Json<ShiftEvent>>,
) -> AppResult<Json<ClosedSession>> {
    ensure_self_or_permission(&current_user, &employee_id, SHIFTS_MANAGE)?;
    let closed = state
        .shifts
        .close_interval(&employee_id, event_time(body))
        .await?;
    Ok(Json(closed))
}

/// GET /api/time-ledger/:employee_id/months/:year/:month - 月度工时
pub async fn get_month(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((employee_id, year, month)): Path<(String, i32, u32)>,
) -> AppResult<Json<MonthSummary>> {
    ensure_self_or_permission(&current_user, &employee_id, SHIFTS_MANAGE)?;
    let summary = ledger::get_month(&state.pool, &employee_id, year, month).await?;
    Ok(Json(summary))
}

/// GET /api/time-ledger/:employee_id/recent?days=30 - 最近 N 天工时
pub async fn recent(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(employee_id): Path<String>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<RecentTotal>> {
    ensure_self_or_permission(&current_user, &employee_id, SHIFTS_MANAGE)?;
    let days = query.days.unwrap_or(ledger::DEFAULT_RECENT_DAYS);
    let total = ledger::recent_total(&state.pool, &employee_id, days, now_millis()).await?;
    Ok(Json(total))
}

/// POST /api/time-ledger/force-close - 强制关闭所有未关闭区间
///
/// 部分失败时返回 207，`data` 中包含完整结果。
pub async fn force_close(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    body: Option<Json<ShiftEvent>>,
) -> AppResult<ApiResponse<ForceCloseOutcome>> {
    let at = event_time(body);
    tracing::info!(user_id = %current_user.id, at, "Force-close requested");

    let outcome = close_all_open_sessions(&state.shifts, at).await?;
    if outcome.is_partial_failure() {
        let message = format!(
            "{} shift(s) closed, {} failed",
            outcome.closed.len(),
            outcome.failed.len()
        );
        return Ok(ApiResponse::partial_failure(message, outcome));
    }
    Ok(ApiResponse::success(outcome))
}
