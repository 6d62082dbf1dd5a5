// ==========================================
// 仓储收货定位系统 - API 数据传输对象
// ==========================================
// 定位/查询类接口统一返回 {success, address?, message?}
// ==========================================

use crate::api::error::ApiError;
use crate::domain::item::ItemDimensions;
use crate::domain::session::SessionSummary;
use serde::{Deserialize, Serialize};

// ==========================================
// ApiResponse - 统一响应
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            address: None,
            message: Some(message.into()),
            error_code: None,
        }
    }

    pub fn with_address(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            address: Some(address.into()),
            message: Some(message.into()),
            error_code: None,
        }
    }

    pub fn from_error(err: &ApiError) -> Self {
        Self {
            success: false,
            address: None,
            message: Some(err.user_message()),
            error_code: Some(err.error_code().to_string()),
        }
    }
}

// ==========================================
// 请求
// ==========================================

/// 收货定位请求（表单字段）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultRequest {
    pub item_id: String,
    pub lot: String,
    pub movement_ref: String,
    pub warehouse: String,
    pub volume: String,
    pub qud: String,
    pub printer_id: String,
}

/// 保存用户请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveUserRequest {
    pub id: String,
    pub upin: String,
    pub secret: String,
    pub name: Option<String>,
}

/// 直接查看库位请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeekLocationRequest {
    pub zone: String,
    pub warehouse: String,
}

// ==========================================
// 响应
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub session_id: String,
    pub user_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginStatus {
    pub logged_in: bool,
    pub session: Option<SessionSummary>,
}

/// 用户信息（不含密码）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub upin: String,
    pub name: Option<String>,
}

/// 物料尺寸核对结果
#[derive(Debug, Clone, Serialize)]
pub struct ItemCubageStatus {
    pub item_id: String,
    pub complete: bool,
    pub created_placeholder: bool,
    pub missing_fields: Vec<&'static str>,
    pub dimensions: ItemDimensions,
}

/// 导出结果
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub success: bool,
    pub message: String,
    pub path: Option<String>,
    pub line_count: usize,
}
