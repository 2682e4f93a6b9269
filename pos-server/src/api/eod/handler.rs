//! EoD API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;
use shared::models::{EodReport, EodSummary};

use crate::api::required;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::eod::reports;
use crate::utils::time;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// POST /api/eod - 执行日结并返回报告
///
/// 日结在独立任务中执行，客户端断开不会中断。
pub async fn generate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<EodReport>> {
    tracing::info!(
        target: "day_close",
        user_id = %current_user.id,
        username = %current_user.username,
        "Day close requested"
    );
    let orchestrator = state.day_close.clone();
    let report = tokio::spawn(async move { orchestrator.generate(Some(&current_user)).await })
        .await
        .map_err(|e| AppError::internal(format!("Day close task failed: {e}")))??;
    Ok(Json(report))
}

/// POST /api/eod/resume - 完成卡在归档阶段的日结
pub async fn resume(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<EodReport>> {
    tracing::info!(
        target: "day_close",
        user_id = %current_user.id,
        "Day close resume requested"
    );
    let orchestrator = state.day_close.clone();
    let report = tokio::spawn(async move { orchestrator.resume().await })
        .await
        .map_err(|e| AppError::internal(format!("Day close task failed: {e}")))??;
    Ok(Json(report))
}

/// GET /api/eod - 日结报告列表 (最新在前)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<EodReport>>> {
    Ok(Json(reports::list(&state.pool).await?))
}

/// GET /api/eod/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EodReport>> {
    Ok(Json(reports::get(&state.pool, id).await?))
}

/// GET /api/eod/date?year&month&day - 按营业日期获取日结报告
pub async fn get_by_date(
    State(state): State<ServerState>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<EodReport>> {
    let date = time::date_from_ymd(
        required(query.year, "year")?,
        required(query.month, "month")?,
        required(query.day, "day")?,
    )?;
    Ok(Json(
        reports::for_date(&state.pool, date, state.config.timezone).await?,
    ))
}

/// GET /api/eod/summary?start_date&end_date - 区间汇总
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<EodSummary>> {
    let start = time::parse_date(&required(query.start_date, "start_date")?)?;
    let end = time::parse_date(&required(query.end_date, "end_date")?)?;
    Ok(Json(
        reports::summary(&state.pool, start, end, state.config.timezone).await?,
    ))
}
