// ==========================================
// 仓储收货定位系统 - 物料尺寸 (Cubagem) 领域模型
// ==========================================
// 对齐: item_cubage 表
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ItemDimensions - 物料尺寸主数据
// ==========================================
// 字段允许为空: 新物料首次出现时会先落一条占位记录，待现场补全
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDimensions {
    pub item_id: String,
    pub length: Option<f64>,          // 长 (m)
    pub width: Option<f64>,           // 宽 (m)
    pub height: Option<f64>,          // 单箱高度 (m)
    pub cubic_volume: Option<f64>,    // 体积 (m³)
    pub units_per_layer: Option<f64>, // 每层箱数 (Cx_Lastro)
}

impl ItemDimensions {
    /// 创建空白占位记录
    pub fn placeholder(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            length: None,
            width: None,
            height: None,
            cubic_volume: None,
            units_per_layer: None,
        }
    }

    /// 缺失（为空或为 0）的字段名
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
            ("cubic_volume", self.cubic_volume),
            ("units_per_layer", self.units_per_layer),
        ];

        fields
            .iter()
            .filter(|(_, v)| !matches!(v, Some(x) if *x != 0.0 && x.is_finite()))
            .map(|(name, _)| *name)
            .collect()
    }

    /// 五个尺寸字段是否全部非空且非零
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ItemDimensions {
        ItemDimensions {
            item_id: "4001".to_string(),
            length: Some(0.4),
            width: Some(0.3),
            height: Some(0.5),
            cubic_volume: Some(0.06),
            units_per_layer: Some(10.0),
        }
    }

    #[test]
    fn test_complete_item() {
        assert!(complete().is_complete());
    }

    #[test]
    fn test_zero_and_missing_fields_are_incomplete() {
        let mut dims = complete();
        dims.units_per_layer = Some(0.0);
        dims.width = None;
        assert!(!dims.is_complete());
        assert_eq!(dims.missing_fields(), vec!["width", "units_per_layer"]);

        let placeholder = ItemDimensions::placeholder("4002");
        assert_eq!(placeholder.missing_fields().len(), 5);
    }
}
