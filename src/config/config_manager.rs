// ==========================================
// 仓储收货定位系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 环境变量: MACRO_PATH 覆盖宏输出目录
// ==========================================

use crate::db::open_sqlite_connection;
use crate::inventory::resilient::{
    parse_auth_signatures, RetryPolicy, DEFAULT_AUTH_SIGNATURES, DEFAULT_BACKOFF_MS,
    DEFAULT_MAX_ATTEMPTS,
};
use crate::printing::sender::{DEFAULT_PRINTER_PORT, DEFAULT_PRINTER_TIMEOUT_MS};
use rusqlite::{params, Connection};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 宏输出目录环境变量
pub const MACRO_PATH_ENV: &str = "MACRO_PATH";

/// 默认打印机
pub const DEFAULT_PRINTER: &str = "BRTEMAN01";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 配置值
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析；格式错误时记录告警并回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 写入 global scope 配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 外部查询重试 =====

    pub fn get_query_max_attempts(&self) -> Result<u32, Box<dyn Error>> {
        let value = self.get_parsed_or_default(config_keys::QUERY_MAX_ATTEMPTS, DEFAULT_MAX_ATTEMPTS)?;
        Ok(value.max(1))
    }

    pub fn get_query_backoff(&self) -> Result<Duration, Box<dyn Error>> {
        let ms = self.get_parsed_or_default(config_keys::QUERY_BACKOFF_MS, DEFAULT_BACKOFF_MS)?;
        Ok(Duration::from_millis(ms))
    }

    pub fn get_auth_error_signatures(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::AUTH_ERROR_SIGNATURES, DEFAULT_AUTH_SIGNATURES)
    }

    // ===== 高度计算 =====

    pub fn get_pallet_base_height(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_parsed_or_default(
            config_keys::PALLET_BASE_HEIGHT_M,
            crate::engine::height::PALLET_BASE_HEIGHT,
        )?;
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Ok(crate::engine::height::PALLET_BASE_HEIGHT)
        }
    }

    // ===== 宏导出 =====

    /// 宏输出目录: MACRO_PATH > config_kv > 数据目录/macros
    pub fn get_macro_output_dir(&self) -> Result<PathBuf, Box<dyn Error>> {
        if let Ok(dir) = std::env::var(MACRO_PATH_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir.trim()));
            }
        }

        if let Some(dir) = self.get_config_value(config_keys::MACRO_OUTPUT_DIR)? {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir.trim()));
            }
        }

        Ok(default_macro_dir())
    }

    // ===== 打印 =====

    pub fn get_printer_port(&self) -> Result<u16, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::PRINTER_PORT, DEFAULT_PRINTER_PORT)
    }

    pub fn get_printer_timeout(&self) -> Result<Duration, Box<dyn Error>> {
        let ms = self.get_parsed_or_default(config_keys::PRINTER_TIMEOUT_MS, DEFAULT_PRINTER_TIMEOUT_MS)?;
        Ok(Duration::from_millis(ms))
    }

    pub fn get_default_printer(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::DEFAULT_PRINTER, DEFAULT_PRINTER)
    }

    /// 一次性读取运行期配置
    pub fn load_settings(&self) -> Result<SlottingSettings, Box<dyn Error>> {
        Ok(SlottingSettings {
            query_max_attempts: self.get_query_max_attempts()?,
            query_backoff: self.get_query_backoff()?,
            auth_error_signatures: self.get_auth_error_signatures()?,
            pallet_base_height: self.get_pallet_base_height()?,
            macro_output_dir: self.get_macro_output_dir()?,
            printer_port: self.get_printer_port()?,
            printer_timeout: self.get_printer_timeout()?,
            default_printer: self.get_default_printer()?,
        })
    }
}

fn default_macro_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("warehouse-slotting")
        .join("macros")
}

// ==========================================
// SlottingSettings - 运行期配置快照
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct SlottingSettings {
    pub query_max_attempts: u32,
    pub query_backoff: Duration,
    pub auth_error_signatures: String,
    pub pallet_base_height: f64,
    pub macro_output_dir: PathBuf,
    pub printer_port: u16,
    pub printer_timeout: Duration,
    pub default_printer: String,
}

impl Default for SlottingSettings {
    fn default() -> Self {
        Self {
            query_max_attempts: DEFAULT_MAX_ATTEMPTS,
            query_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            auth_error_signatures: DEFAULT_AUTH_SIGNATURES.to_string(),
            pallet_base_height: crate::engine::height::PALLET_BASE_HEIGHT,
            macro_output_dir: default_macro_dir(),
            printer_port: DEFAULT_PRINTER_PORT,
            printer_timeout: Duration::from_millis(DEFAULT_PRINTER_TIMEOUT_MS),
            default_printer: DEFAULT_PRINTER.to_string(),
        }
    }
}

impl SlottingSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.query_max_attempts,
            backoff: self.query_backoff,
            auth_signatures: parse_auth_signatures(&self.auth_error_signatures),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 外部查询
    pub const QUERY_MAX_ATTEMPTS: &str = "query_max_attempts";
    pub const QUERY_BACKOFF_MS: &str = "query_backoff_ms";
    pub const AUTH_ERROR_SIGNATURES: &str = "auth_error_signatures"; // CODE=KIND,...

    // 高度
    pub const PALLET_BASE_HEIGHT_M: &str = "pallet_base_height_m";

    // 宏导出
    pub const MACRO_OUTPUT_DIR: &str = "macro_output_dir";

    // 打印
    pub const PRINTER_PORT: &str = "printer_port";
    pub const PRINTER_TIMEOUT_MS: &str = "printer_timeout_ms";
    pub const DEFAULT_PRINTER: &str = "default_printer";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cm = manager();
        assert_eq!(cm.get_query_max_attempts().unwrap(), 3);
        assert_eq!(cm.get_query_backoff().unwrap(), Duration::from_secs(2));
        assert_eq!(cm.get_pallet_base_height().unwrap(), 0.15);
        assert_eq!(cm.get_printer_port().unwrap(), 9100);
        assert_eq!(cm.get_default_printer().unwrap(), "BRTEMAN01");

        let policy = SlottingSettings::default().retry_policy();
        assert_eq!(policy.auth_signatures.len(), 2);
    }

    #[test]
    fn test_override_and_bad_values() {
        let cm = manager();
        cm.set_config_value(config_keys::QUERY_MAX_ATTEMPTS, "5").unwrap();
        cm.set_config_value(config_keys::QUERY_BACKOFF_MS, "abc").unwrap();
        cm.set_config_value(config_keys::PALLET_BASE_HEIGHT_M, "-1").unwrap();

        assert_eq!(cm.get_query_max_attempts().unwrap(), 5);
        assert_eq!(cm.get_query_backoff().unwrap(), Duration::from_millis(2000));
        assert_eq!(cm.get_pallet_base_height().unwrap(), 0.15);

        cm.set_config_value(config_keys::QUERY_MAX_ATTEMPTS, "0").unwrap();
        assert_eq!(cm.get_query_max_attempts().unwrap(), 1);
    }

    #[test]
    fn test_snapshot() {
        let cm = manager();
        cm.set_config_value("b_key", "2").unwrap();
        cm.set_config_value("a_key", "1").unwrap();
        assert_eq!(cm.get_config_snapshot().unwrap(), r#"{"a_key":"1","b_key":"2"}"#);
    }
}
