// ==========================================
// 仓储收货定位系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod item;
pub mod location;
pub mod macro_script;
pub mod receipt;
pub mod session;
pub mod types;
pub mod user;

// 重导出核心类型
pub use item::ItemDimensions;
pub use location::{Allocation, AllocationRequest, Location, MovementRef};
pub use macro_script::{Keystroke, MacroLine, MacroScript, MACRO_FILE_NAME};
pub use receipt::{ReceiptQuery, ReceiptRecord};
pub use session::{AllocationSession, SessionSummary};
pub use types::{ItemClass, Zone};
pub use user::{Credentials, OperatorUser};
