// ==========================================
// 仓储收货定位系统 - 外部库存系统 SQLite 镜像
// ==========================================
// 表: storage_location（库位主数据）/ inflight_load（在途装载占用）
//     receipt_movement（收货单）
// 说明: 凭据对本地镜像不生效；真实驱动在连接时使用 upin/secret
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::location::Location;
use crate::domain::receipt::{ReceiptQuery, ReceiptRecord};
use crate::domain::user::Credentials;
use crate::inventory::{BackendError, InventoryBackend, LocationQuery};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex};

/// 可上架状态代码
const STATUS_AVAILABLE: &str = "E";

pub struct SqliteInventoryBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteInventoryBackend {
    pub fn new(db_path: &str) -> Result<Self, BackendError> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> Result<std::sync::MutexGuard<Connection>, BackendError> {
        self.conn
            .lock()
            .map_err(|e| BackendError::Connection(format!("锁获取失败: {}", e)))
    }

    // ==========================================
    // 镜像维护（同步任务 / 测试数据使用）
    // ==========================================

    /// 新增或更新库位
    pub fn upsert_location(&self, location: &Location, status_code: &str) -> Result<(), BackendError> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO storage_location (warehouse, address, zone, height, status_code)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(warehouse, address) DO UPDATE SET
                zone = excluded.zone,
                height = excluded.height,
                status_code = excluded.status_code
            "#,
            params![
                location.warehouse,
                location.address,
                location.zone.code(),
                location.available_height,
                status_code,
            ],
        )?;
        Ok(())
    }

    /// 登记在途装载（库位被占用）
    pub fn add_inflight_load(&self, warehouse: &str, address: &str, load_ref: &str) -> Result<(), BackendError> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO inflight_load (warehouse, address, load_ref) VALUES (?1, ?2, ?3)",
            params![warehouse, address, load_ref],
        )?;
        Ok(())
    }

    /// 登记收货单
    pub fn add_receipt(&self, receipt: &ReceiptRecord) -> Result<(), BackendError> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO receipt_movement (warehouse, item_id, lot, movement_ref, quantity, class_code, movement_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, date('now'))
            "#,
            params![
                receipt.warehouse,
                receipt.item_id,
                receipt.lot,
                receipt.movement_ref,
                receipt.quantity,
                receipt.class_code,
            ],
        )?;
        Ok(())
    }

    fn select_free_location(conn: &Connection, query: &LocationQuery) -> Result<Option<Location>, BackendError> {
        let mut sql = String::from(
            r#"
            SELECT l.address, l.height
            FROM storage_location l
            WHERE l.warehouse = ?
              AND l.record_id = 'LE'
              AND l.location_type = '0'
              AND l.status_code = ?
              AND ROUND(l.height, 2) >= ?
              AND NOT EXISTS (
                  SELECT 1 FROM inflight_load f
                  WHERE f.warehouse = l.warehouse AND f.address = l.address
              )
              AND UPPER(l.zone) = ?
            "#,
        );

        let mut values: Vec<Value> = vec![
            Value::Text(query.warehouse.trim().to_string()),
            Value::Text(STATUS_AVAILABLE.to_string()),
            Value::Real(query.min_height),
            Value::Text(query.zone.code().to_string()),
        ];

        if !query.excluded.is_empty() {
            let placeholders = vec!["?"; query.excluded.len()].join(",");
            sql.push_str(&format!(" AND l.address NOT IN ({})", placeholders));
            values.extend(query.excluded.iter().map(|a| Value::Text(a.clone())));
        }

        sql.push_str(
            r#"
            ORDER BY
                CASE WHEN UPPER(l.zone) = 'RUA' THEN 2 ELSE 1 END,
                ROUND(l.height, 2) ASC,
                l.address ASC
            LIMIT 1
            "#,
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(values.iter()))?;

        match rows.next()? {
            Some(row) => Ok(Some(Location {
                address: row.get(0)?,
                warehouse: query.warehouse.trim().to_string(),
                zone: query.zone,
                available_height: row.get(1)?,
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl InventoryBackend for SqliteInventoryBackend {
    async fn find_free_location(
        &self,
        _credentials: &Credentials,
        query: &LocationQuery,
    ) -> Result<Option<Location>, BackendError> {
        let conn = self.get_conn()?;
        let found = Self::select_free_location(&conn, query)?;

        if let Some(ref location) = found {
            tracing::debug!(
                zone = %query.zone,
                address = %location.address,
                height = location.available_height,
                "选中库位"
            );
        }
        Ok(found)
    }

    async fn find_receipt(
        &self,
        _credentials: &Credentials,
        query: &ReceiptQuery,
    ) -> Result<Option<ReceiptRecord>, BackendError> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            r#"
            SELECT warehouse, item_id, lot, quantity, movement_ref, SUBSTR(class_code, 1, 1)
            FROM receipt_movement
            WHERE item_id = ?1
              AND lot = ?2
              AND movement_ref = ?3
              AND printf('%.3f', quantity) = ?4
              AND warehouse = ?5
            LIMIT 1
            "#,
            params![
                query.item_id.trim(),
                query.lot.trim(),
                query.movement_ref.trim(),
                query.quantity_key(),
                query.warehouse.trim(),
            ],
            |row| {
                Ok(ReceiptRecord {
                    warehouse: row.get(0)?,
                    item_id: row.get(1)?,
                    lot: row.get(2)?,
                    quantity: row.get(3)?,
                    movement_ref: row.get(4)?,
                    class_code: row.get(5)?,
                })
            },
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
