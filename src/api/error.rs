// ==========================================
// 仓储收货定位系统 - API层错误类型
// ==========================================
// 职责: 汇总下层错误，提供稳定错误码与本地化提示
// ==========================================

use crate::engine::error::{AllocationFailure, ExportError};
use crate::i18n::{t, t_with_args};
use crate::importer::ImportError;
use crate::inventory::{AuthFailureKind, AuthenticationError};
use crate::printing::PrintError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与会话
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数量无效: {0}")]
    InvalidQuantity(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("会话不存在或已过期: {0}")]
    SessionExpired(String),

    // ==========================================
    // 定位业务错误
    // ==========================================
    #[error("物料尺寸数据不完整: item={item_id}, 缺失={missing:?}")]
    IncompleteItem {
        item_id: String,
        missing: Vec<&'static str>,
    },

    #[error("尺寸或数量无效: {0}")]
    InvalidDimensions(String),

    #[error(transparent)]
    Authentication(AuthenticationError),

    #[error("收货单与外部系统不一致: {0}")]
    ReceiptMismatch(String),

    #[error("无可用库位: {0}")]
    NoLocationAvailable(String),

    // ==========================================
    // 打印与导出
    // ==========================================
    #[error("未知打印机: {0}")]
    UnknownPrinter(String),

    #[error("打印失败: {0}")]
    PrintFailed(String),

    #[error("没有可导出的宏行")]
    NothingToExport,

    #[error("宏导出失败: {0}")]
    ExportFailed(String),

    // ==========================================
    // 数据访问与导入
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定错误码（JSON 响应使用）
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::InvalidQuantity(_) => "INVALID_QUANTITY",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::SessionExpired(_) => "SESSION_EXPIRED",
            ApiError::IncompleteItem { .. } => "INCOMPLETE_ITEM",
            ApiError::InvalidDimensions(_) => "INVALID_DIMENSIONS",
            ApiError::Authentication(_) => "AUTHENTICATION_FAILED",
            ApiError::ReceiptMismatch(_) => "RECEIPT_MISMATCH",
            ApiError::NoLocationAvailable(_) => "NO_LOCATION_AVAILABLE",
            ApiError::UnknownPrinter(_) => "UNKNOWN_PRINTER",
            ApiError::PrintFailed(_) => "PRINT_CONNECTION_FAILED",
            ApiError::NothingToExport => "NOTHING_TO_EXPORT",
            ApiError::ExportFailed(_) => "EXPORT_FAILED",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::ImportError(_) => "IMPORT_FAILED",
            ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否属于非预期错误（需记录 error 日志，向操作员返回通用提示）
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            ApiError::DatabaseError(_) | ApiError::Other(_)
        )
    }

    /// 面向操作员的本地化提示
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidInput(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::InvalidQuantity(_) => t("consult.invalid_quantity"),
            ApiError::SessionExpired(_) => t("session.expired"),
            ApiError::IncompleteItem { .. } => t("item.incomplete_cubage"),
            ApiError::InvalidDimensions(reason) => {
                t_with_args("item.invalid_dimensions", &[("reason", reason)])
            }
            ApiError::Authentication(auth) => match auth.kind {
                AuthFailureKind::PasswordRejected => t("auth.password_rejected"),
                AuthFailureKind::AccountLocked => t("auth.account_locked"),
                AuthFailureKind::Rejected => t("auth.rejected"),
            },
            ApiError::ReceiptMismatch(_) => t("consult.receipt_mismatch"),
            ApiError::NoLocationAvailable(_) => t("consult.no_location"),
            ApiError::UnknownPrinter(device) => {
                t_with_args("print.unknown_device", &[("device", device)])
            }
            ApiError::PrintFailed(_) => t("print.connection_failed"),
            ApiError::NothingToExport => t("export.nothing"),
            ApiError::ExportFailed(err) => t_with_args("export.failed", &[("error", err)]),
            ApiError::ImportError(msg) => msg.clone(),
            ApiError::DatabaseError(_) | ApiError::Other(_) => {
                t("common.unexpected_error")
            }
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::FileWriteError { path, message } => {
                ApiError::ExportFailed(format!("{}: {}", path, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<AllocationFailure> for ApiError {
    fn from(err: AllocationFailure) -> Self {
        match err {
            AllocationFailure::IncompleteItem { item_id, missing } => {
                ApiError::IncompleteItem { item_id, missing }
            }
            AllocationFailure::InvalidDimensions(msg) => ApiError::InvalidDimensions(msg),
            AllocationFailure::Authentication(auth) => ApiError::Authentication(auth),
            failure @ AllocationFailure::NoLocationAvailable { .. } => {
                ApiError::NoLocationAvailable(failure.to_string())
            }
            AllocationFailure::Storage(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<AuthenticationError> for ApiError {
    fn from(err: AuthenticationError) -> Self {
        ApiError::Authentication(err)
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NothingToExport => ApiError::NothingToExport,
            ExportError::Sink(msg) => ApiError::ExportFailed(msg),
        }
    }
}

impl From<PrintError> for ApiError {
    fn from(err: PrintError) -> Self {
        match err {
            PrintError::UnknownDevice(device) => ApiError::UnknownPrinter(device),
            connection @ PrintError::Connection { .. } => ApiError::PrintFailed(connection.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(path),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Zone;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::NotFound {
            entity: "OperatorUser".to_string(),
            id: "u9".to_string(),
        }
        .into();
        match api_err {
            ApiError::NotFound(msg) => assert!(msg.contains("u9")),
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let api_err: ApiError = RepositoryError::DatabaseQueryError("boom".to_string()).into();
        assert!(api_err.is_unexpected());
    }

    #[test]
    fn test_allocation_failure_codes() {
        let api_err: ApiError = AllocationFailure::NoLocationAvailable {
            item_id: "4001".to_string(),
            zones_tried: vec![Zone::Peq, Zone::Med, Zone::Rua],
        }
        .into();
        assert_eq!(api_err.error_code(), "NO_LOCATION_AVAILABLE");
        assert!(!api_err.is_unexpected());

        let api_err: ApiError = AllocationFailure::Authentication(AuthenticationError {
            kind: AuthFailureKind::AccountLocked,
            signature: "CWBSY0011".to_string(),
            message: "locked".to_string(),
        })
        .into();
        assert_eq!(api_err.error_code(), "AUTHENTICATION_FAILED");
    }

    #[test]
    fn test_print_and_export_conversion() {
        let api_err: ApiError = PrintError::UnknownDevice("X".to_string()).into();
        assert_eq!(api_err.error_code(), "UNKNOWN_PRINTER");

        let api_err: ApiError = ExportError::NothingToExport.into();
        assert_eq!(api_err.error_code(), "NOTHING_TO_EXPORT");
    }
}
