// ==========================================
// 仓储收货定位系统 - 应用层
// ==========================================
// 职责: 装配各层并提供进程级共享状态
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
