//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 健康检查 (数据库 + 日结状态) | 无 |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "uptime_seconds": 42,
//!   "database": { "status": "ok", "latency_ms": 1 },
//!   "day_close": { "status": "idle", "current_epoch": 7 }
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::{Instant, SystemTime};

use crate::core::ServerState;
use crate::db::repository::day_close::DayCloseStatus;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// ok | degraded | error
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    database: CheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    day_close: Option<DayCloseHealth>,
}

#[derive(Serialize)]
pub struct CheckResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
pub struct DayCloseHealth {
    status: DayCloseStatus,
    current_epoch: i64,
    /// 卡在归档阶段的日结报告
    #[serde(skip_serializing_if = "Option::is_none")]
    pending_report_id: Option<i64>,
}

static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

/// 记录启动时间，服务启动时调用
pub fn mark_started() {
    START_TIME.get_or_init(SystemTime::now);
}

fn get_uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// GET /health
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let day_close = state.day_close.state().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let (database, day_close) = match day_close {
        Ok(marker) => (
            CheckResult {
                status: "ok",
                latency_ms: Some(latency_ms),
                message: None,
            },
            Some(DayCloseHealth {
                pending_report_id: (marker.status == DayCloseStatus::Reported)
                    .then_some(marker.report_id)
                    .flatten(),
                status: marker.status,
                current_epoch: marker.current_epoch,
            }),
        ),
        Err(e) => (
            CheckResult {
                status: "error",
                latency_ms: None,
                message: Some(e.to_string()),
            },
            None,
        ),
    };

    let status = match (&day_close, database.status) {
        (_, "error") => "error",
        (Some(dc), _) if dc.status == DayCloseStatus::Reported => "degraded",
        _ => "ok",
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: get_uptime_seconds(),
        database,
        day_close,
    })
}
