// ==========================================
// 仓储收货定位系统 - 候选区域选择
// ==========================================
// 阈值（含上界）:
//   h ≤ 1.00 → PEQ, MED, RUA
//   h ≤ 1.35 → MED, GRA, RUA
//   h ≤ 2.00 → GRA, RUA
//   其他     → RUA
// ==========================================

use crate::domain::types::Zone;

const PEQ_MAX_HEIGHT: f64 = 1.0;
const MED_MAX_HEIGHT: f64 = 1.35;
const GRA_MAX_HEIGHT: f64 = 2.0;

/// 所需高度 → 按偏好排序的候选区域（总以 RUA 结尾）
pub fn candidate_zones(required_height: f64) -> Vec<Zone> {
    if required_height <= PEQ_MAX_HEIGHT {
        vec![Zone::Peq, Zone::Med, Zone::Rua]
    } else if required_height <= MED_MAX_HEIGHT {
        vec![Zone::Med, Zone::Gra, Zone::Rua]
    } else if required_height <= GRA_MAX_HEIGHT {
        vec![Zone::Gra, Zone::Rua]
    } else {
        vec![Zone::Rua]
    }
}
