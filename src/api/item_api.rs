// ==========================================
// 仓储收货定位系统 - 物料尺寸 API
// ==========================================
// 职责: 核对物料尺寸是否完整 / 保存物料尺寸
// ==========================================

use std::sync::Arc;

use crate::api::dto::ItemCubageStatus;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::item::ItemDimensions;
use crate::repository::ItemCubageRepository;

pub struct ItemApi {
    item_repo: Arc<ItemCubageRepository>,
}

impl ItemApi {
    pub fn new(item_repo: Arc<ItemCubageRepository>) -> Self {
        Self { item_repo }
    }

    /// 核对物料尺寸
    ///
    /// 物料不存在时写入空白占位记录，提示操作员补全
    pub fn verify_item_cubage(&self, item_id: &str) -> ApiResult<ItemCubageStatus> {
        let item_id = item_id.trim();
        if item_id.is_empty() {
            return Err(ApiError::InvalidInput("item_id 不能为空".to_string()));
        }

        let (dimensions, created_placeholder) = match self.item_repo.find_by_item(item_id)? {
            Some(dims) => (dims, false),
            None => {
                let placeholder = ItemDimensions::placeholder(item_id);
                self.item_repo.upsert(&placeholder)?;
                tracing::info!(item_id, "物料无尺寸记录，已创建占位");
                (placeholder, true)
            }
        };

        Ok(ItemCubageStatus {
            item_id: item_id.to_string(),
            complete: dimensions.is_complete(),
            created_placeholder,
            missing_fields: dimensions.missing_fields(),
            dimensions,
        })
    }

    /// 保存物料尺寸（UPSERT，体积保留 4 位小数）
    pub fn save_item_cubage(&self, dimensions: &ItemDimensions) -> ApiResult<()> {
        let fields = [
            ("length", dimensions.length),
            ("width", dimensions.width),
            ("height", dimensions.height),
            ("cubic_volume", dimensions.cubic_volume),
            ("units_per_layer", dimensions.units_per_layer),
        ];
        for (field, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ApiError::InvalidInput(format!("{} 数值无效: {}", field, v)));
                }
            }
        }

        self.item_repo.upsert(dimensions)?;
        tracing::info!(item_id = %dimensions.item_id, complete = dimensions.is_complete(), "物料尺寸已保存");
        Ok(())
    }
}
