//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`eod`] - 日结与日结报告
//! - [`receipts`] - 结账与小票
//! - [`orders`] - 当日订单
//! - [`time_ledger`] - 员工工时

pub mod eod;
pub mod health;
pub mod orders;
pub mod receipts;
pub mod time_ledger;

use crate::utils::{AppError, AppResult};

/// 必填查询参数
pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> AppResult<T> {
    value.ok_or_else(|| AppError::required(field))
}
