// ==========================================
// 仓储收货定位系统 - 导入模块
// ==========================================
// 职责: 物料尺寸主数据 (cubagem) 的 CSV/Excel 批量导入
// ==========================================

pub mod cubage_importer;
pub mod error;
pub mod file_parser;

pub use cubage_importer::{CubageImportReport, CubageImporter, RejectedRow};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
