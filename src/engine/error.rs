// ==========================================
// 仓储收货定位系统 - 引擎层错误类型
// ==========================================
// 每种失败一个变体，调用方按变体分支，不匹配消息字符串
// ==========================================

use crate::domain::types::Zone;
use crate::inventory::AuthenticationError;
use thiserror::Error;

/// 定位失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationFailure {
    #[error("物料尺寸数据不完整: item={item_id}, 缺失字段={missing:?}")]
    IncompleteItem {
        item_id: String,
        missing: Vec<&'static str>,
    },

    #[error("尺寸或数量无效: {0}")]
    InvalidDimensions(String),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error("无可用库位: item={item_id}, 已尝试区域={zones_tried:?}")]
    NoLocationAvailable {
        item_id: String,
        zones_tried: Vec<Zone>,
    },

    #[error("主数据读取失败: {0}")]
    Storage(String),
}

impl AllocationFailure {
    /// 稳定的失败原因代码（日志/审计使用）
    pub fn reason_code(&self) -> &'static str {
        match self {
            AllocationFailure::IncompleteItem { .. } => "incomplete_item",
            AllocationFailure::InvalidDimensions(_) => "invalid_dimensions",
            AllocationFailure::Authentication(_) => "authentication",
            AllocationFailure::NoLocationAvailable { .. } => "no_location_available",
            AllocationFailure::Storage(_) => "storage",
        }
    }
}

/// 导出失败
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("没有可导出的宏行")]
    NothingToExport,

    #[error("宏文件写入失败: {0}")]
    Sink(String),
}
