// ==========================================
// 仓储收货定位系统 - 仓储层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("记录不存在: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    /// 共享连接的 Mutex 已中毒
    #[error("连接锁不可用: {0}")]
    LockError(String),

    #[error("SQLite 执行失败: {0}")]
    DatabaseQueryError(String),

    #[error("字段 {field} 取值无效: {message}")]
    FieldValueError { field: String, message: String },

    // 宏文件导出
    #[error("写入 {path} 失败: {message}")]
    FileWriteError { path: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "row".to_string(),
                id: "?".to_string(),
            },
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
