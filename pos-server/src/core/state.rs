use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::core::tasks::BackgroundTasks;
use crate::db::DbService;
use crate::eod::{DayCloseOrchestrator, RetryPolicy};
use crate::services::{Catalog, SqliteCatalog};
use crate::shifts::{ShiftAutoCloseScheduler, ShiftTracker};
use crate::utils::AppResult;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是廉价克隆 (连接池 / Arc)，直接作为 axum State 使用。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 校验 |
/// | catalog | 菜单条目解析 (checkout 使用) |
/// | shifts | 员工工时记录 |
/// | day_close | 日结状态机 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub catalog: Arc<dyn Catalog>,
    pub shifts: ShiftTracker,
    pub day_close: DayCloseOrchestrator,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录结构
    /// 2. 打开数据库并执行迁移
    /// 3. 恢复中断的日结标记
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config.ensure_work_dir_structure().map_err(|e| {
            crate::utils::AppError::internal(format!("Failed to create work dir: {e}"))
        })?;

        let db_path = config.database_dir().join("pos.db");
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        let state = Self::with_pool(config.clone(), db.pool);
        state.day_close.recover().await?;
        Ok(state)
    }

    /// 使用现有连接池构造 (测试使用内存数据库)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let catalog: Arc<dyn Catalog> = Arc::new(SqliteCatalog::new(pool.clone()));
        let shifts = ShiftTracker::new(pool.clone(), config.timezone);
        let day_close = DayCloseOrchestrator::new(
            pool.clone(),
            RetryPolicy::new(
                config.day_close_retry_attempts,
                Duration::from_millis(config.day_close_retry_base_delay_ms),
            ),
        );

        Self {
            config,
            pool,
            jwt_service,
            catalog,
            shifts,
            day_close,
        }
    }

    /// 启动后台任务
    ///
    /// 目前只有可选的每日自动关班调度器。
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        match self.config.shift_auto_close_at {
            Some(close_at) => {
                let scheduler = ShiftAutoCloseScheduler::new(
                    self.shifts.clone(),
                    close_at,
                    tasks.shutdown_token(),
                );
                tasks.spawn("shift_auto_close", scheduler.run());
            }
            None => tracing::info!("SHIFT_AUTO_CLOSE_AT not set, shift auto-close disabled"),
        }

        tasks.log_summary();
        tasks
    }
}
