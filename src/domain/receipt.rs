// ==========================================
// 仓储收货定位系统 - 收货单据
// ==========================================
// 定位前先核对收货单在外部系统中存在，并取得物料分类代码
// ==========================================

use serde::{Deserialize, Serialize};

/// 收货单查询条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptQuery {
    pub item_id: String,
    pub lot: String,
    pub movement_ref: String,
    pub quantity: f64, // = QUD × 数量，按 3 位小数比较
    pub warehouse: String,
}

impl ReceiptQuery {
    /// 外部系统按 3 位小数存储数量
    pub fn quantity_key(&self) -> String {
        format!("{:.3}", self.quantity)
    }
}

/// 收货单记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub warehouse: String,
    pub item_id: String,
    pub lot: String,
    pub quantity: f64,
    pub movement_ref: String,
    pub class_code: Option<String>,
}
