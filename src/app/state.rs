// ==========================================
// 仓储收货定位系统 - 应用状态
// ==========================================
// 职责: 装配 Repository / Engine / API，管理共享资源
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{ItemApi, ReceivingApi, SessionStore, UserApi};
use crate::config::{ConfigManager, SlottingSettings};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::{HeightCalculator, MacroAssembler, SlotAllocationEngine};
use crate::importer::CubageImporter;
use crate::inventory::{InventoryBackend, ResilientQueryLayer, SqliteInventoryBackend};
use crate::printing::{LabelSender, LabelService, PrinterRegistry, TcpLabelSender};
use crate::repository::{
    AllocationLogRepository, ItemCubageRepository, MacroFileRepository, UserRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SLOTTING_DB_PATH";

/// 应用状态
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 运行期配置快照
    pub settings: SlottingSettings,

    pub config_manager: Arc<ConfigManager>,
    pub sessions: Arc<SessionStore>,

    pub user_api: Arc<UserApi>,
    pub item_api: Arc<ItemApi>,
    pub receiving_api: Arc<ReceivingApi>,

    /// 尺寸主数据批量导入
    pub cubage_importer: Arc<CubageImporter>,

    /// 外部库存查询层（重试统计）
    pub query_layer: Arc<ResilientQueryLayer>,
}

impl AppState {
    /// 使用本地 SQLite 镜像作为外部库存系统、TCP 打印
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| format!("无法创建ConfigManager: {}", e))?;
        let settings = config_manager
            .load_settings()
            .map_err(|e| format!("配置加载失败: {}", e))?;

        let backend: Arc<dyn InventoryBackend> =
            Arc::new(SqliteInventoryBackend::from_connection(conn.clone()));
        let sender: Arc<dyn LabelSender> =
            Arc::new(TcpLabelSender::new(settings.printer_port, settings.printer_timeout));

        Ok(Self::assemble(db_path, conn, config_manager, settings, backend, sender))
    }

    /// 注入外部库存系统与打印发送器（测试或其他驱动使用）
    pub fn with_collaborators(
        db_path: String,
        conn: Arc<Mutex<Connection>>,
        settings: SlottingSettings,
        backend: Arc<dyn InventoryBackend>,
        sender: Arc<dyn LabelSender>,
    ) -> Result<Self, String> {
        {
            let guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            ensure_schema(&guard).map_err(|e| format!("数据库建表失败: {}", e))?;
        }
        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| format!("无法创建ConfigManager: {}", e))?;

        Ok(Self::assemble(db_path, conn, config_manager, settings, backend, sender))
    }

    fn assemble(
        db_path: String,
        conn: Arc<Mutex<Connection>>,
        config_manager: ConfigManager,
        settings: SlottingSettings,
        backend: Arc<dyn InventoryBackend>,
        sender: Arc<dyn LabelSender>,
    ) -> Self {
        // ==========================================
        // Repository 层
        // ==========================================
        let user_repo = Arc::new(UserRepository::from_connection(conn.clone()));
        let item_repo = Arc::new(ItemCubageRepository::from_connection(conn.clone()));
        let log_repo = Arc::new(AllocationLogRepository::new(conn));
        let macro_repo = Arc::new(MacroFileRepository::new(settings.macro_output_dir.clone()));

        // ==========================================
        // Engine 层
        // ==========================================
        let query_layer = Arc::new(ResilientQueryLayer::new(backend, settings.retry_policy()));
        let engine = Arc::new(SlotAllocationEngine::new(
            item_repo.clone(),
            query_layer.clone(),
            HeightCalculator::new(settings.pallet_base_height),
        ));
        let assembler = Arc::new(MacroAssembler::new(macro_repo));
        let labels = Arc::new(LabelService::new(PrinterRegistry::default(), sender));

        // ==========================================
        // API 层
        // ==========================================
        let sessions = Arc::new(SessionStore::new());
        let user_api = Arc::new(UserApi::new(user_repo.clone(), sessions.clone(), log_repo.clone()));
        let item_api = Arc::new(ItemApi::new(item_repo.clone()));
        let receiving_api = Arc::new(ReceivingApi::new(
            engine,
            assembler,
            labels,
            sessions.clone(),
            user_repo,
            item_repo.clone(),
            log_repo,
        ));
        let cubage_importer = Arc::new(CubageImporter::new(item_repo));

        tracing::info!(
            max_attempts = settings.query_max_attempts,
            macro_dir = %settings.macro_output_dir.display(),
            default_printer = %settings.default_printer,
            "AppState初始化完成"
        );

        Self {
            db_path,
            settings,
            config_manager: Arc::new(config_manager),
            sessions,
            user_api,
            item_api,
            receiving_api,
            cubage_importer,
            query_layer,
        }
    }
}

/// 默认数据库路径: SLOTTING_DB_PATH > 用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./warehouse_slotting.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("warehouse-slotting");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("warehouse_slotting.db");
        }
    }

    path.to_string_lossy().to_string()
}
