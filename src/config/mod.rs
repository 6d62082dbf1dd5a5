// ==========================================
// 仓储收货定位系统 - 配置层
// ==========================================
// 职责: 系统配置管理（重试、高度、宏导出、打印）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, SlottingSettings, MACRO_PATH_ENV};
