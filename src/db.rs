// ==========================================
// 仓储收货定位系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 统一建表入口（幂等），测试与生产共用同一套 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 创建全部业务表（幂等）
///
/// 表分为三组:
/// - 本地主数据: operator_user / item_cubage / config_kv
/// - 外部库存系统镜像: storage_location / inflight_load / receipt_movement
/// - 审计: allocation_log
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS operator_user (
            id TEXT PRIMARY KEY,
            upin TEXT NOT NULL,
            secret TEXT NOT NULL,
            name TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS item_cubage (
            item_id TEXT PRIMARY KEY,
            length REAL,
            width REAL,
            height REAL,
            cubic_volume REAL,
            units_per_layer REAL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS storage_location (
            warehouse TEXT NOT NULL,
            address TEXT NOT NULL,
            zone TEXT NOT NULL,
            height REAL NOT NULL,
            record_id TEXT NOT NULL DEFAULT 'LE',
            location_type TEXT NOT NULL DEFAULT '0',
            status_code TEXT NOT NULL DEFAULT 'E',
            PRIMARY KEY (warehouse, address)
        );

        CREATE TABLE IF NOT EXISTS inflight_load (
            warehouse TEXT NOT NULL,
            address TEXT NOT NULL,
            load_ref TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_inflight_load_location
            ON inflight_load (warehouse, address);

        CREATE TABLE IF NOT EXISTS receipt_movement (
            warehouse TEXT NOT NULL,
            item_id TEXT NOT NULL,
            lot TEXT NOT NULL,
            movement_ref TEXT NOT NULL,
            quantity REAL NOT NULL,
            class_code TEXT,
            movement_date TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_receipt_movement_lookup
            ON receipt_movement (item_id, lot, movement_ref, warehouse);

        CREATE TABLE IF NOT EXISTS allocation_log (
            log_id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            user_id TEXT,
            action_type TEXT NOT NULL,
            warehouse TEXT,
            address TEXT,
            zone TEXT,
            item_id TEXT,
            movement_ref TEXT,
            detail TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_allocation_log_session
            ON allocation_log (session_id, created_at);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), None);

        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }
}
