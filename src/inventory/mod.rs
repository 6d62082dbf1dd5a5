// ==========================================
// 仓储收货定位系统 - 外部库存系统接入层
// ==========================================
// 职责: 定义外部库存系统 (BPCS) 的只读查询接口
// 红线: 本层只读，从不修改外部系统状态
// ==========================================
// - backend: 具体数据源（SQLite 镜像 / 其他驱动）实现 InventoryBackend
// - resilient: 有界重试 + 认证失败识别
// ==========================================

pub mod resilient;
pub mod sqlite_backend;

use crate::domain::location::Location;
use crate::domain::receipt::{ReceiptQuery, ReceiptRecord};
use crate::domain::types::Zone;
use crate::domain::user::Credentials;
use async_trait::async_trait;
use thiserror::Error;

pub use resilient::{
    parse_auth_signatures, AuthFailureKind, AuthSignature, AuthenticationError,
    ResilientQueryLayer, RetryPolicy,
};
pub use sqlite_backend::SqliteInventoryBackend;

// ==========================================
// BackendError - 外部系统原始错误
// ==========================================
// 认证类错误靠消息中的错误签名（如 CWBSY0002）识别，由 resilient 层分类
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("连接外部系统失败: {0}")]
    Connection(String),

    #[error("外部系统查询失败: {0}")]
    Query(String),
}

impl BackendError {
    pub fn message(&self) -> &str {
        match self {
            BackendError::Connection(msg) | BackendError::Query(msg) => msg,
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        BackendError::Query(err.to_string())
    }
}

// ==========================================
// LocationQuery - 空闲库位查询条件
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct LocationQuery {
    pub zone: Zone,
    pub warehouse: String,
    pub excluded: Vec<String>,
    pub min_height: f64,
}

// ==========================================
// InventoryBackend Trait
// ==========================================
/// 外部库存系统查询接口
///
/// # 选择规则（find_free_location）
/// - 状态为“可上架”，仓库与区域匹配
/// - 高度 ≥ min_height，地址不在 excluded 中
/// - 未被任何在途装载占用
/// - 排序: RUA 在最后 → 高度升序 → 地址升序，取第一条
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    async fn find_free_location(
        &self,
        credentials: &Credentials,
        query: &LocationQuery,
    ) -> Result<Option<Location>, BackendError>;

    /// 核对收货单，返回带分类代码的记录
    async fn find_receipt(
        &self,
        credentials: &Credentials,
        query: &ReceiptQuery,
    ) -> Result<Option<ReceiptRecord>, BackendError>;
}
