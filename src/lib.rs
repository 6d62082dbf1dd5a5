// ==========================================
// 仓储收货定位系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 收货上架辅助（库位分配 + 终端宏生成），人工最终确认
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 外部库存系统接入层
pub mod inventory;

// 引擎层 - 业务规则
pub mod engine;

// 标签打印
pub mod printing;

// 导入层 - 尺寸主数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ItemClass, Zone};

// 领域实体
pub use domain::{
    Allocation, AllocationRequest, AllocationSession, ItemDimensions, Location, MacroScript,
    MovementRef,
};

// 引擎
pub use engine::{
    candidate_zones, required_height, AllocationFailure, ExportError, MacroAssembler,
    SlotAllocationEngine,
};

// 外部查询
pub use inventory::{AuthenticationError, ResilientQueryLayer, RetryPolicy};

// API
pub use api::{ApiResponse, ItemApi, ReceivingApi, UserApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Recebimento 2.0";
