//! POS Server - 餐厅后台日结与员工工时服务
//!
//! # 架构概述
//!
//! - **日结** (`eod`): 汇总当日小票、生成日结报告、归档并重置当日数据
//! - **工时** (`shifts`): 员工上下班区间、月度工时、强制关班
//! - **收银** (`orders`, `receipts`): 当日订单与结账小票
//! - **数据库** (`db`): SQLite (WAL) + sqlx 迁移
//! - **认证** (`auth`): JWT 校验与权限
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、后台任务
//! ├── auth/          # JWT 认证、权限
//! ├── services/      # 外部依赖接口 (菜单)
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 中间件装配
//! ├── utils/         # 工具函数
//! ├── db/            # 数据库层
//! ├── orders/        # 当日订单
//! ├── receipts/      # 小票生命周期
//! ├── eod/           # 日结
//! └── shifts/        # 员工工时
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod eod;
pub mod orders;
pub mod receipts;
pub mod routes;
pub mod services;
pub mod shifts;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use eod::DayCloseOrchestrator;
pub use routes::build_app;
pub use shifts::ShiftTracker;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境
///
/// 1. 加载 `.env`
/// 2. 读取配置
/// 3. 创建工作目录并初始化日志 (控制台 + `work_dir/logs`)
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    config.ensure_work_dir_structure()?;
    init_logger(&config.log_level, config.log_json, Some(&config.log_dir()))?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/
  / /_/ / / / /\__ \
 / ____/ /_/ /___/ /
/_/    \____//____/
   ______
  / ____/__  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
