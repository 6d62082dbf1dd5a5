// ==========================================
// 仓储收货定位系统 - 库位分配引擎
// ==========================================
// 流程:
// 1. 读取物料尺寸（缺失/不完整 → IncompleteItem）
// 2. 计算所需高度（数量无效 → InvalidDimensions）
// 3. 按高度得到候选区域
// 4. 逐区域查询空闲库位（排除本会话已分配地址），第一个命中即采用
// 5. 命中 → 写入会话排除集；全部落空 → NoLocationAvailable
// ==========================================
// 红线: 首个命中区域即定案，不跨区域回溯或择优
// ==========================================

use crate::domain::location::{Allocation, AllocationRequest};
use crate::domain::session::AllocationSession;
use crate::domain::user::Credentials;
use crate::engine::error::AllocationFailure;
use crate::engine::height::HeightCalculator;
use crate::engine::repositories::ItemDimensionSource;
use crate::engine::zone_selector::candidate_zones;
use crate::inventory::ResilientQueryLayer;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// SlotAllocationEngine
// ==========================================
pub struct SlotAllocationEngine {
    item_source: Arc<dyn ItemDimensionSource>,
    query_layer: Arc<ResilientQueryLayer>,
    height_calculator: HeightCalculator,
}

impl SlotAllocationEngine {
    pub fn new(
        item_source: Arc<dyn ItemDimensionSource>,
        query_layer: Arc<ResilientQueryLayer>,
        height_calculator: HeightCalculator,
    ) -> Self {
        Self {
            item_source,
            query_layer,
            height_calculator,
        }
    }

    pub fn query_layer(&self) -> &Arc<ResilientQueryLayer> {
        &self.query_layer
    }

    /// 为一次收货请求分配库位
    ///
    /// 失败时会话状态保持不变
    #[instrument(
        skip(self, request, session, credentials),
        fields(item_id = %request.item_id, warehouse = %request.warehouse, session_id = %session.session_id())
    )]
    pub async fn allocate(
        &self,
        request: &AllocationRequest,
        session: &mut AllocationSession,
        credentials: &Credentials,
    ) -> Result<Allocation, AllocationFailure> {
        // ===== Step 1: 物料尺寸 =====
        let dimensions = self
            .item_source
            .get_item_dimensions(&request.item_id)
            .map_err(|e| AllocationFailure::Storage(e.to_string()))?
            .ok_or_else(|| AllocationFailure::IncompleteItem {
                item_id: request.item_id.clone(),
                missing: vec!["length", "width", "height", "cubic_volume", "units_per_layer"],
            })?;

        // ===== Step 2: 所需高度 =====
        let volume = request.parsed_volume().ok_or_else(|| {
            AllocationFailure::InvalidDimensions(format!(
                "数量无法解析: {:?}",
                request.requested_volume
            ))
        })?;
        let required_height = self.height_calculator.required_height(&dimensions, volume)?;

        // ===== Step 3: 候选区域 =====
        let zones = candidate_zones(required_height);
        tracing::info!(required_height, zones = ?zones, "开始逐区域查询");

        // ===== Step 4: 逐区域 first-fit =====
        for zone in zones.iter().copied() {
            let found = self
                .query_layer
                .query_location(
                    credentials,
                    zone,
                    &request.warehouse,
                    session.locations_used(),
                    required_height,
                )
                .await?;

            // 后端未遵守排除集时按未命中处理
            let found = found.filter(|location| {
                let reused = session.is_excluded(&location.address);
                if reused {
                    tracing::warn!(zone = %zone, address = %location.address, "后端返回了本会话已分配的库位，忽略");
                }
                !reused
            });

            if let Some(location) = found {
                // ===== Step 5: 记录排除 =====
                session.record_location(&location.address);
                tracing::info!(
                    zone = %zone,
                    address = %location.address,
                    available_height = location.available_height,
                    "库位分配成功"
                );
                return Ok(Allocation {
                    location,
                    zone,
                    required_height,
                });
            }

            tracing::debug!(zone = %zone, "区域无可用库位，尝试下一区域");
        }

        tracing::warn!(zones = ?zones, "所有候选区域均无可用库位");
        Err(AllocationFailure::NoLocationAvailable {
            item_id: request.item_id.clone(),
            zones_tried: zones,
        })
    }
}
