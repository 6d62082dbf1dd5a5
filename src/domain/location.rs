// ==========================================
// 仓储收货定位系统 - 库位与分配请求
// ==========================================
// Location 以外部库存系统为准，本系统只读
// ==========================================

use crate::domain::types::Zone;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Location - 库位
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,       // 库位地址
    pub warehouse: String,     // 仓库
    pub zone: Zone,            // 区域
    pub available_height: f64, // 可用高度 (m)
}

impl Location {
    pub fn new(warehouse: &str, address: &str, zone: Zone, available_height: f64) -> Self {
        Self {
            address: address.to_string(),
            warehouse: warehouse.to_string(),
            zone,
            available_height,
        }
    }
}

// ==========================================
// MovementRef - 收货单号（归一化后）
// ==========================================
// 规则: 去空白、转大写、去掉一个前导 "W"、取最后 6 位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRef(String);

impl MovementRef {
    /// 从操作员输入归一化
    pub fn normalize(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        let stripped = upper.strip_prefix('W').unwrap_or(&upper);
        let chars: Vec<char> = stripped.chars().collect();
        let start = chars.len().saturating_sub(6);
        Self(chars[start..].iter().collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// AllocationRequest - 单次定位请求
// ==========================================
/// requested_volume 保留操作员原始输入：NSTD 宏行需原样写入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub item_id: String,
    pub warehouse: String,
    pub requested_volume: String,
    pub movement_ref: MovementRef,
    pub class_code: Option<String>,
}

impl AllocationRequest {
    /// 解析数量（失败返回 None，由引擎转为 InvalidDimensions）
    pub fn parsed_volume(&self) -> Option<f64> {
        self.requested_volume
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }
}

// ==========================================
// Allocation - 定位结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub location: Location,
    pub zone: Zone,
    pub required_height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_ref_normalization() {
        assert_eq!(MovementRef::normalize("W001234").as_str(), "001234");
        assert_eq!(MovementRef::normalize(" w0012345678 ").as_str(), "345678");
        assert_eq!(MovementRef::normalize("1234").as_str(), "1234");
        // 只去掉一个前导 W
        assert_eq!(MovementRef::normalize("WW12").as_str(), "W12");
        assert_eq!(MovementRef::normalize("").as_str(), "");
    }

    #[test]
    fn test_parsed_volume() {
        let mut request = AllocationRequest {
            item_id: "4001".to_string(),
            warehouse: "10".to_string(),
            requested_volume: "50".to_string(),
            movement_ref: MovementRef::normalize("W001234"),
            class_code: None,
        };
        assert_eq!(request.parsed_volume(), Some(50.0));

        request.requested_volume = "12,5".to_string();
        assert_eq!(request.parsed_volume(), Some(12.5));

        request.requested_volume = "abc".to_string();
        assert_eq!(request.parsed_volume(), None);
    }
}
