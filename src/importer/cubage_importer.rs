// ==========================================
// 仓储收货定位系统 - 物料尺寸批量导入
// ==========================================
// 列: Item, Comprimento, Largura, Altura, Cubagem, Cx_Lastro（大小写不敏感）
// 规则:
// - Item 为空 → 该行拒绝
// - 数值列为空 → 记为缺失（物料保持“待补全”）
// - 数值列无法解析或为负 → 该行拒绝
// - 合格行一次事务写入
// ==========================================

use crate::domain::item::ItemDimensions;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use crate::repository::ItemCubageRepository;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

const COL_ITEM: &str = "item";
const COL_LENGTH: &str = "comprimento";
const COL_WIDTH: &str = "largura";
const COL_HEIGHT: &str = "altura";
const COL_VOLUME: &str = "cubagem";
const COL_UNITS_PER_LAYER: &str = "cx_lastro";

/// 被拒绝的行（行号从 1 开始，不含表头）
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CubageImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

pub struct CubageImporter {
    repo: Arc<ItemCubageRepository>,
}

impl CubageImporter {
    pub fn new(repo: Arc<ItemCubageRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<CubageImportReport> {
        let records = UniversalFileParser.parse(file_path.as_ref())?;
        let report = self.import_records(&records)?;
        tracing::info!(
            total = report.total_rows,
            imported = report.imported,
            rejected = report.rejected.len(),
            "尺寸主数据导入完成"
        );
        Ok(report)
    }

    /// 导入已解析的行
    pub fn import_records(&self, records: &[RawRecord]) -> ImportResult<CubageImportReport> {
        let mut report = CubageImportReport {
            total_rows: records.len(),
            ..CubageImportReport::default()
        };

        if let Some(first) = records.first() {
            if lookup(first, COL_ITEM).is_none() {
                return Err(ImportError::MissingColumn("Item".to_string()));
            }
        }

        let mut accepted = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            match map_record(row, record) {
                Ok(dims) => accepted.push(dims),
                Err(e) => {
                    tracing::warn!(row, error = %e, "尺寸行被拒绝");
                    report.rejected.push(RejectedRow {
                        row,
                        message: e.to_string(),
                    });
                }
            }
        }

        report.imported = if accepted.is_empty() {
            0
        } else {
            self.repo.batch_upsert(&accepted)?
        };
        Ok(report)
    }
}

/// 按列名（忽略大小写/首尾空白）取值
fn lookup<'a>(record: &'a RawRecord, column: &str) -> Option<&'a str> {
    record
        .iter()
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(column))
        .map(|(_, v)| v.as_str())
}

fn parse_measure(row: usize, record: &RawRecord, column: &str) -> ImportResult<Option<f64>> {
    let raw = match lookup(record, column).map(str::trim) {
        None | Some("") => return Ok(None),
        Some(v) => v,
    };

    let value = raw.replace(',', ".").parse::<f64>().map_err(|e| ImportError::TypeConversionError {
        row,
        field: column.to_string(),
        message: format!("{:?}: {}", raw, e),
    })?;

    if !value.is_finite() || value < 0.0 {
        return Err(ImportError::TypeConversionError {
            row,
            field: column.to_string(),
            message: format!("数值无效: {}", raw),
        });
    }
    Ok(Some(value))
}

fn map_record(row: usize, record: &RawRecord) -> ImportResult<ItemDimensions> {
    let item_id = lookup(record, COL_ITEM).map(str::trim).unwrap_or("");
    if item_id.is_empty() {
        return Err(ImportError::PrimaryKeyMissing(row));
    }

    Ok(ItemDimensions {
        item_id: item_id.to_string(),
        length: parse_measure(row, record, COL_LENGTH)?,
        width: parse_measure(row, record, COL_WIDTH)?,
        height: parse_measure(row, record, COL_HEIGHT)?,
        cubic_volume: parse_measure(row, record, COL_VOLUME)?,
        units_per_layer: parse_measure(row, record, COL_UNITS_PER_LAYER)?,
    })
}
