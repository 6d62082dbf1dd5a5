use crate::db::open_sqlite_connection;
use crate::domain::item::ItemDimensions;
use crate::engine::repositories::ItemDimensionSource;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ItemCubageRepository - 物料尺寸主数据仓储
// ==========================================
/// 物料尺寸 (Cubagem) 仓储
/// 职责: 管理 item_cubage 表，按 item_id 读取/upsert
/// 约束: 没有删除路径；upsert 后写者为准
pub struct ItemCubageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemCubageRepository {
    /// 创建新的 ItemCubageRepository 实例
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

    /// 按 item_id 查询
    pub fn find_by_item(&self, item_id: &str) -> RepositoryResult<Option<ItemDimensions>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            r#"
            SELECT item_id, length, width, height, cubic_volume, units_per_layer
            FROM item_cubage
            WHERE item_id = ?1
            "#,
            params![item_id.trim()],
            |row| {
                Ok(ItemDimensions {
                    item_id: row.get(0)?,
                    length: row.get(1)?,
                    width: row.get(2)?,
                    height: row.get(3)?,
                    cubic_volume: row.get(4)?,
                    units_per_layer: row.get(5)?,
                })
            },
        );

        match result {
            Ok(dims) => Ok(Some(dims)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 新增或更新物料尺寸
    ///
    /// # 说明
    /// - cubic_volume 保存前四舍五入到 4 位小数
    /// - item_id 为空时拒绝写入
    pub fn upsert(&self, dims: &ItemDimensions) -> RepositoryResult<()> {
        let item_id = dims.item_id.trim();
        if item_id.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "item_id".to_string(),
                message: "不能为空".to_string(),
            });
        }

        let cubic_volume = dims.cubic_volume.map(|v| (v * 10_000.0).round() / 10_000.0);

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO item_cubage (item_id, length, width, height, cubic_volume, units_per_layer, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
            ON CONFLICT(item_id) DO UPDATE SET
                length = excluded.length,
                width = excluded.width,
                height = excluded.height,
                cubic_volume = excluded.cubic_volume,
                units_per_layer = excluded.units_per_layer,
                updated_at = excluded.updated_at
            "#,
            params![
                item_id,
                dims.length,
                dims.width,
                dims.height,
                cubic_volume,
                dims.units_per_layer,
            ],
        )?;
        Ok(())
    }

    /// 批量 upsert（单事务）
    pub fn batch_upsert(&self, items: &[ItemDimensions]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for dims in items {
            tx.execute(
                r#"
                INSERT INTO item_cubage (item_id, length, width, height, cubic_volume, units_per_layer, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
                ON CONFLICT(item_id) DO UPDATE SET
                    length = excluded.length,
                    width = excluded.width,
                    height = excluded.height,
                    cubic_volume = excluded.cubic_volume,
                    units_per_layer = excluded.units_per_layer,
                    updated_at = excluded.updated_at
                "#,
                params![
                    dims.item_id.trim(),
                    dims.length,
                    dims.width,
                    dims.height,
                    dims.cubic_volume.map(|v| (v * 10_000.0).round() / 10_000.0),
                    dims.units_per_layer,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }
}

impl ItemDimensionSource for ItemCubageRepository {
    fn get_item_dimensions(&self, item_id: &str) -> RepositoryResult<Option<ItemDimensions>> {
        self.find_by_item(item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn setup() -> ItemCubageRepository {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ItemCubageRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_upsert_last_write_wins() {
        let repo = setup();
        let mut dims = ItemDimensions {
            item_id: "4001".to_string(),
            length: Some(0.4),
            width: Some(0.3),
            height: Some(0.5),
            cubic_volume: Some(0.123456),
            units_per_layer: Some(10.0),
        };
        repo.upsert(&dims).unwrap();

        let stored = repo.find_by_item("4001").unwrap().unwrap();
        assert_eq!(stored.cubic_volume, Some(0.1235));

        dims.units_per_layer = Some(12.0);
        repo.upsert(&dims).unwrap();
        let stored = repo.find_by_item("4001").unwrap().unwrap();
        assert_eq!(stored.units_per_layer, Some(12.0));
    }

    #[test]
    fn test_placeholder_roundtrips_nulls() {
        let repo = setup();
        repo.upsert(&ItemDimensions::placeholder("4002")).unwrap();

        let stored = repo.find_by_item("4002").unwrap().unwrap();
        assert!(!stored.is_complete());
        assert!(repo.find_by_item("9999").unwrap().is_none());
    }

    #[test]
    fn test_empty_item_id_rejected() {
        let repo = setup();
        let result = repo.upsert(&ItemDimensions::placeholder("  "));
        assert!(matches!(result, Err(RepositoryError::FieldValueError { .. })));
    }
}
