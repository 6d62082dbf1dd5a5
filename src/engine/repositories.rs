// ==========================================
// 仓储收货定位系统 - 引擎层依赖接口
// ==========================================
// 职责: 定义定位引擎/宏组装所需的外部协作者接口
// 实现: repository 层 (ItemCubageRepository / MacroFileRepository)
// ==========================================

use crate::domain::item::ItemDimensions;
use crate::domain::macro_script::MacroScript;
use crate::repository::error::RepositoryResult;

/// 物料尺寸主数据来源
///
/// 按 item_id 读取；不存在返回 None
pub trait ItemDimensionSource: Send + Sync {
    fn get_item_dimensions(&self, item_id: &str) -> RepositoryResult<Option<ItemDimensions>>;
}

/// 宏脚本持久化目标
///
/// 写入成功返回最终路径（或等价的定位标识）
pub trait MacroSink: Send + Sync {
    fn write_script(&self, script: &MacroScript) -> RepositoryResult<String>;
}
