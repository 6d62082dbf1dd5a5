// ==========================================
// 仓储收货定位系统 - API 层
// ==========================================
// 职责: 面向操作员界面的业务接口（用户 / 物料尺寸 / 收货定位）
// ==========================================

pub mod dto;
pub mod error;
pub mod item_api;
pub mod receiving_api;
pub mod session_store;
pub mod user_api;

// 重导出核心类型
pub use dto::{
    ApiResponse, ConsultRequest, ExportResponse, ItemCubageStatus, LoginResponse, LoginStatus,
    PeekLocationRequest, SaveUserRequest, UserInfo,
};
pub use error::{ApiError, ApiResult};
pub use item_api::ItemApi;
pub use receiving_api::ReceivingApi;
pub use session_store::{SessionStore, SharedSession};
pub use user_api::UserApi;
