// ==========================================
// 仓储收货定位系统 - 引擎层
// ==========================================
// 职责: 高度计算 / 区域选择 / 库位分配 / 宏组装
// 红线: Engine 不拼 SQL，外部数据一律经 trait 注入
// ==========================================

pub mod allocation;
pub mod error;
pub mod height;
pub mod macro_assembly;
pub mod repositories;
pub mod zone_selector;

// 重导出核心引擎
pub use allocation::SlotAllocationEngine;
pub use error::{AllocationFailure, ExportError};
pub use height::{required_height, HeightCalculator, PALLET_BASE_HEIGHT};
pub use macro_assembly::{ExportOutcome, MacroAssembler};
pub use repositories::{ItemDimensionSource, MacroSink};
pub use zone_selector::candidate_zones;
