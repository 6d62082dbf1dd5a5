// ==========================================
// 仓储收货定位系统 - 定位审计日志仓储
// ==========================================
// 对齐: allocation_log 表
// 记录每次成功定位、导出与标签打印失败，供事后追溯
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 审计动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationAction {
    Allocate,
    PrintFailed,
    Export,
    Logout,
}

impl AllocationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationAction::Allocate => "ALLOCATE",
            AllocationAction::PrintFailed => "PRINT_FAILED",
            AllocationAction::Export => "EXPORT",
            AllocationAction::Logout => "LOGOUT",
        }
    }
}

/// 审计日志条目
#[derive(Debug, Clone, Serialize)]
pub struct AllocationLogEntry {
    pub log_id: String,
    pub session_id: String,
    pub user_id: Option<String>,
    pub action_type: String,
    pub warehouse: Option<String>,
    pub address: Option<String>,
    pub zone: Option<String>,
    pub item_id: Option<String>,
    pub movement_ref: Option<String>,
    pub detail: Option<String>,
    pub created_at: NaiveDateTime,
}

impl AllocationLogEntry {
    pub fn new(session_id: &str, user_id: &str, action: AllocationAction) -> Self {
        Self {
            log_id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            user_id: Some(user_id.to_string()),
            action_type: action.as_str().to_string(),
            warehouse: None,
            address: None,
            zone: None,
            item_id: None,
            movement_ref: None,
            detail: None,
            created_at: Utc::now().naive_utc(),
        }
    }
}

// ==========================================
// AllocationLogRepository
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct AllocationLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AllocationLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入审计日志
    pub fn insert(&self, entry: &AllocationLogEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO allocation_log (
                log_id, session_id, user_id, action_type, warehouse, address,
                zone, item_id, movement_ref, detail, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                entry.log_id,
                entry.session_id,
                entry.user_id,
                entry.action_type,
                entry.warehouse,
                entry.address,
                entry.zone,
                entry.item_id,
                entry.movement_ref,
                entry.detail,
                entry.created_at.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            ],
        )?;
        Ok(entry.log_id.clone())
    }

    /// 按会话查询（按时间升序）
    pub fn list_by_session(&self, session_id: &str) -> RepositoryResult<Vec<AllocationLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT log_id, session_id, user_id, action_type, warehouse, address,
                   zone, item_id, movement_ref, detail, created_at
            FROM allocation_log
            WHERE session_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )?;

        let rows = stmt.query_map(params![session_id], |row| {
            let created_at: String = row.get(10)?;
            Ok(AllocationLogEntry {
                log_id: row.get(0)?,
                session_id: row.get(1)?,
                user_id: row.get(2)?,
                action_type: row.get(3)?,
                warehouse: row.get(4)?,
                address: row.get(5)?,
                zone: row.get(6)?,
                item_id: row.get(7)?,
                movement_ref: row.get(8)?,
                detail: row.get(9)?,
                created_at: NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S%.f")
                    .unwrap_or_else(|_| Utc::now().naive_utc()),
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}
