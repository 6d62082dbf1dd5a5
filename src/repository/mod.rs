// ==========================================
// 仓储收货定位系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod allocation_log_repo;
pub mod error;
pub mod item_cubage_repo;
pub mod macro_file_repo;
pub mod user_repo;

// 重导出核心仓储
pub use allocation_log_repo::{AllocationAction, AllocationLogEntry, AllocationLogRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use item_cubage_repo::ItemCubageRepository;
pub use macro_file_repo::MacroFileRepository;
pub use user_repo::{SaveUserOutcome, UserRepository};
