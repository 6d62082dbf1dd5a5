// ==========================================
// 仓储收货定位系统 - 操作员会话状态
// ==========================================
// 每个会话独立持有: 已分配库位（排除集）+ 待导出宏行
// 不落库；导出成功或注销时整体清空
// ==========================================

use crate::domain::macro_script::MacroLine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

// ==========================================
// AllocationSession - 定位会话
// ==========================================
#[derive(Debug, Clone)]
pub struct AllocationSession {
    session_id: String,
    user_id: String,
    upin: String,
    started_at: DateTime<Utc>,
    locations_used: Vec<String>,
    macro_buffer: Vec<MacroLine>,
}

/// 会话概要（返回给前端）
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub user_id: String,
    pub locations_used: usize,
    pub macro_count: usize,
}

impl AllocationSession {
    /// 登录时创建空会话
    pub fn new(user_id: &str, upin: &str) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            upin: upin.to_string(),
            started_at: Utc::now(),
            locations_used: Vec::new(),
            macro_buffer: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn upin(&self) -> &str {
        &self.upin
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 已分配库位（按分配顺序）
    pub fn locations_used(&self) -> &[String] {
        &self.locations_used
    }

    /// 待导出宏行（按追加顺序）
    pub fn macro_buffer(&self) -> &[MacroLine] {
        &self.macro_buffer
    }

    pub fn is_excluded(&self, address: &str) -> bool {
        self.locations_used.iter().any(|a| a == address)
    }

    /// 记录一次成功分配的库位；已记录的地址不重复追加
    pub fn record_location(&mut self, address: &str) {
        if !self.is_excluded(address) {
            self.locations_used.push(address.to_string());
        }
    }

    pub fn push_macro_line(&mut self, line: MacroLine) {
        self.macro_buffer.push(line);
    }

    /// 同时清空排除集与宏缓冲
    pub fn reset(&mut self) {
        self.locations_used.clear();
        self.macro_buffer.clear();
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            user_id: self.user_id.clone(),
            locations_used: self.locations_used.len(),
            macro_count: self.macro_buffer.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_reset() {
        let mut session = AllocationSession::new("u1", "UPIN1");
        session.record_location("A1-01-01");
        session.push_macro_line(MacroLine::new().text("x"));

        assert!(session.is_excluded("A1-01-01"));
        assert!(!session.is_excluded("A1-01-02"));
        assert_eq!(session.summary().macro_count, 1);

        session.reset();
        assert!(session.locations_used().is_empty());
        assert!(session.macro_buffer().is_empty());
        assert_eq!(session.user_id(), "u1");
    }

    #[test]
    fn test_recording_same_address_twice_keeps_one_entry() {
        let mut session = AllocationSession::new("u1", "UPIN1");
        session.record_location("A1-01-01");
        session.record_location("A1-01-01");
        assert_eq!(session.locations_used(), &["A1-01-01".to_string()]);
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        let a = AllocationSession::new("u1", "P");
        let b = AllocationSession::new("u1", "P");
        assert_ne!(a.session_id(), b.session_id());
    }
}
