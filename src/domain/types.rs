// ==========================================
// 仓储收货定位系统 - 领域类型定义
// ==========================================
// 区域 (Zone) 与物料分类 (ItemClass)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 存储区域 (Zone)
// ==========================================
// 闭集: PEQ < MED < GRA < RUA
// RUA 为无高度上限的通道兜底区，永远排在最后
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    Peq, // 小
    Med, // 中
    Gra, // 大
    Rua, // 通道兜底
}

impl Zone {
    /// 外部系统中的区域代码
    pub fn code(&self) -> &'static str {
        match self {
            Zone::Peq => "PEQ",
            Zone::Med => "MED",
            Zone::Gra => "GRA",
            Zone::Rua => "RUA",
        }
    }

    /// 是否为有高度上限的货架区（PEQ/MED/GRA）
    ///
    /// 标签排版按此区分边距与字宽
    pub fn is_rack(&self) -> bool {
        !matches!(self, Zone::Rua)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PEQ" => Ok(Zone::Peq),
            "MED" => Ok(Zone::Med),
            "GRA" => Ok(Zone::Gra),
            "RUA" => Ok(Zone::Rua),
            other => Err(format!("未知区域代码: {}", other)),
        }
    }
}

// ==========================================
// 物料分类 (Item Class)
// ==========================================
// 由外部系统的 class 代码推导，决定宏行是否带数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemClass {
    Std,  // 标准件
    Nstd, // 非标件（宏行需带数量）
}

impl ItemClass {
    /// 从外部 class 代码推导
    ///
    /// - "1" / "7" → STD
    /// - "2" → NSTD
    /// - 其他或缺失 → STD（安全默认值，不报错）
    pub fn from_class_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("2") => ItemClass::Nstd,
            _ => ItemClass::Std,
        }
    }
}

impl fmt::Display for ItemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemClass::Std => write!(f, "STD"),
            ItemClass::Nstd => write!(f, "NSTD"),
        }
    }
}
