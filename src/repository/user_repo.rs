use crate::db::open_sqlite_connection;
use crate::domain::user::OperatorUser;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// UserRepository - 操作员用户仓储
// ==========================================
/// 操作员用户仓储
/// 职责: 管理 operator_user 表（id → upin/secret/name）
/// 红线: 不含业务逻辑，只负责数据访问
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

/// 保存用户的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveUserOutcome {
    Created,
    Updated,
}

impl SaveUserOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveUserOutcome::Created => "criado",
            SaveUserOutcome::Updated => "atualizado",
        }
    }
}

impl UserRepository {
    /// 创建新的 UserRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 id 查询用户
    ///
    /// # 返回
    /// - Ok(Some(OperatorUser)): 找到记录
    /// - Ok(None): 未找到记录
    pub fn find_by_id(&self, user_id: &str) -> RepositoryResult<Option<OperatorUser>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT id, upin, secret, name FROM operator_user WHERE id = ?1",
            params![user_id.trim()],
            |row| {
                Ok(OperatorUser {
                    id: row.get(0)?,
                    upin: row.get(1)?,
                    secret: row.get(2)?,
                    name: row.get(3)?,
                })
            },
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 新建用户
    pub fn create(&self, user: &OperatorUser) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO operator_user (id, upin, secret, name) VALUES (?1, ?2, ?3, ?4)",
            params![user.id.trim(), user.upin, user.secret, user.name],
        )?;
        Ok(())
    }

    /// 更新用户密码
    pub fn update_secret(&self, user_id: &str, secret: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE operator_user SET secret = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![secret, user_id.trim()],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "OperatorUser".to_string(),
                id: user_id.to_string(),
            });
        }
        Ok(())
    }

    /// 保存用户: 已存在则只更新密码，否则新建
    pub fn save(&self, user: &OperatorUser) -> RepositoryResult<SaveUserOutcome> {
        if self.find_by_id(&user.id)?.is_some() {
            self.update_secret(&user.id, &user.secret)?;
            Ok(SaveUserOutcome::Updated)
        } else {
            self.create(user)?;
            Ok(SaveUserOutcome::Created)
        }
    }
}
