// ==========================================
// 仓储收货定位系统 - 所需高度计算
// ==========================================
// 公式: ceil(数量 / 每层箱数) × 单箱高度 + 托盘底座高度
// 结果保留 2 位小数
// ==========================================
// 层数统一向上取整: 不足一层按一层计，永远不会低估高度
// ==========================================

use crate::domain::item::ItemDimensions;
use crate::engine::error::AllocationFailure;

/// 托盘底座高度 (m)
pub const PALLET_BASE_HEIGHT: f64 = 0.15;

/// 高度计算器
#[derive(Debug, Clone, Copy)]
pub struct HeightCalculator {
    pallet_base_height: f64,
}

impl Default for HeightCalculator {
    fn default() -> Self {
        Self::new(PALLET_BASE_HEIGHT)
    }
}

impl HeightCalculator {
    pub fn new(pallet_base_height: f64) -> Self {
        Self { pallet_base_height }
    }

    pub fn pallet_base_height(&self) -> f64 {
        self.pallet_base_height
    }

    /// 计算所需库位高度
    ///
    /// # 错误
    /// - 尺寸不完整 → IncompleteItem
    /// - 每层箱数或单箱高度 <= 0 → InvalidDimensions
    /// - 数量为负/非有限值 → InvalidDimensions
    pub fn required_height(
        &self,
        dimensions: &ItemDimensions,
        requested_volume: f64,
    ) -> Result<f64, AllocationFailure> {
        if !dimensions.is_complete() {
            return Err(AllocationFailure::IncompleteItem {
                item_id: dimensions.item_id.clone(),
                missing: dimensions.missing_fields(),
            });
        }

        // is_complete 只保证非空非零；负值同样会低估高度
        let (units_per_layer, unit_height) =
            match (dimensions.units_per_layer, dimensions.height) {
                (Some(upl), Some(h)) if upl > 0.0 && h > 0.0 => (upl, h),
                (upl, h) => {
                    return Err(AllocationFailure::InvalidDimensions(format!(
                        "item {} 每层箱数/高度必须为正: upl={:?}, height={:?}",
                        dimensions.item_id, upl, h
                    )))
                }
            };

        if !requested_volume.is_finite() || requested_volume < 0.0 {
            return Err(AllocationFailure::InvalidDimensions(format!(
                "数量无效: {}",
                requested_volume
            )));
        }

        let layers = (requested_volume / units_per_layer).ceil();
        let raw = layers * unit_height + self.pallet_base_height;
        if !raw.is_finite() {
            return Err(AllocationFailure::InvalidDimensions(format!(
                "高度计算溢出: item={}",
                dimensions.item_id
            )));
        }

        Ok(round2(raw))
    }
}

/// 便捷函数：使用默认底座高度
pub fn required_height(
    dimensions: &ItemDimensions,
    requested_volume: f64,
) -> Result<f64, AllocationFailure> {
    HeightCalculator::default().required_height(dimensions, requested_volume)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(height: f64, upl: f64) -> ItemDimensions {
        ItemDimensions {
            item_id: "4001".to_string(),
            length: Some(0.4),
            width: Some(0.3),
            height: Some(height),
            cubic_volume: Some(0.06),
            units_per_layer: Some(upl),
        }
    }

    #[test]
    fn test_partial_layer_rounds_up() {
        // 5 / 10 = 0.5 层 → 1 层
        assert_eq!(required_height(&dims(0.5, 10.0), 5.0).unwrap(), 0.65);
        assert_eq!(required_height(&dims(0.5, 10.0), 11.0).unwrap(), 1.15);
        assert_eq!(required_height(&dims(0.5, 10.0), 20.0).unwrap(), 1.15);
    }

    #[test]
    fn test_zero_volume_is_base_only() {
        assert_eq!(required_height(&dims(0.5, 10.0), 0.0).unwrap(), 0.15);
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        assert_eq!(required_height(&dims(0.333, 4.0), 8.0).unwrap(), 0.82);
    }

    #[test]
    fn test_monotonic_in_volume() {
        let d = dims(0.27, 7.0);
        let mut last = 0.0;
        for v in 0..200 {
            let h = required_height(&d, v as f64 * 0.5).unwrap();
            assert!(h >= last, "volume {} gave {} < {}", v, h, last);
            last = h;
        }
    }

    #[test]
    fn test_incomplete_and_invalid() {
        let mut d = dims(0.5, 10.0);
        d.units_per_layer = Some(0.0);
        match required_height(&d, 5.0) {
            Err(AllocationFailure::IncompleteItem { missing, .. }) => {
                assert_eq!(missing, vec!["units_per_layer"])
            }
            other => panic!("unexpected: {:?}", other),
        }

        let d = dims(0.5, 10.0);
        assert!(matches!(
            required_height(&d, -1.0),
            Err(AllocationFailure::InvalidDimensions(_))
        ));
        assert!(matches!(
            required_height(&d, f64::NAN),
            Err(AllocationFailure::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_negative_layer_or_height_is_invalid() {
        for d in [dims(0.5, -10.0), dims(-0.5, 10.0)] {
            assert!(d.is_complete());
            assert!(matches!(
                required_height(&d, 20.0),
                Err(AllocationFailure::InvalidDimensions(_))
            ));
        }
    }

    #[test]
    fn test_custom_base_height() {
        let calc = HeightCalculator::new(0.2);
        assert_eq!(calc.required_height(&dims(0.5, 10.0), 5.0).unwrap(), 0.7);
    }
}
