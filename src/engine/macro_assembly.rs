// ==========================================
// 仓储收货定位系统 - 宏组装
// ==========================================
// STD : <仓库>[tab]W<单号>[tab][enter]<地址>[enter][pf6]
// NSTD: <仓库>[tab]W<单号>[tab][enter]<地址><数量>[enter][pf6]
// 导出: 全部宏行按顺序拼接（无分隔符）放入固定外壳，写入后清空会话
// ==========================================

use crate::domain::location::{Allocation, AllocationRequest};
use crate::domain::macro_script::{Keystroke, MacroLine, MacroScript};
use crate::domain::session::AllocationSession;
use crate::domain::types::ItemClass;
use crate::engine::error::ExportError;
use crate::engine::repositories::MacroSink;
use serde::Serialize;
use std::sync::Arc;

/// 导出结果
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub path: String,
    pub line_count: usize,
}

pub struct MacroAssembler {
    sink: Arc<dyn MacroSink>,
}

impl MacroAssembler {
    pub fn new(sink: Arc<dyn MacroSink>) -> Self {
        Self { sink }
    }

    /// 按物料分类构造单条宏行
    pub fn build_line(
        allocation: &Allocation,
        request: &AllocationRequest,
        item_class: ItemClass,
    ) -> MacroLine {
        let mut line = MacroLine::new()
            .text(request.warehouse.trim())
            .key(Keystroke::Tab)
            .text(format!("W{}", request.movement_ref))
            .key(Keystroke::Tab)
            .key(Keystroke::Enter)
            .text(allocation.location.address.as_str());

        if item_class == ItemClass::Nstd {
            line = line.text(request.requested_volume.trim());
        }

        line.key(Keystroke::Enter).key(Keystroke::Pf6)
    }

    /// 构造宏行并追加到会话缓冲区
    pub fn append_macro(
        session: &mut AllocationSession,
        allocation: &Allocation,
        request: &AllocationRequest,
        item_class: ItemClass,
    ) -> MacroLine {
        let line = Self::build_line(allocation, request, item_class);
        tracing::debug!(
            session_id = %session.session_id(),
            item_class = %item_class,
            line = %line.render(),
            "追加宏行"
        );
        session.push_macro_line(line.clone());
        line
    }

    /// 由会话缓冲区生成宏脚本（不修改会话）
    pub fn build_script(session: &AllocationSession) -> Result<MacroScript, ExportError> {
        if session.macro_buffer().is_empty() {
            return Err(ExportError::NothingToExport);
        }
        Ok(MacroScript::new(session.macro_buffer().to_vec()))
    }

    /// 导出: 写入持久化目标，成功后清空会话
    ///
    /// 写入失败时会话保持原样，可重新导出
    pub fn export(&self, session: &mut AllocationSession) -> Result<ExportOutcome, ExportError> {
        let script = Self::build_script(session)?;
        let path = self
            .sink
            .write_script(&script)
            .map_err(|e| ExportError::Sink(e.to_string()))?;

        let line_count = script.line_count();
        session.reset();

        tracing::info!(path = %path, line_count, "宏脚本导出完成");
        Ok(ExportOutcome { path, line_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::{Location, MovementRef};
    use crate::domain::types::Zone;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CaptureSink {
        written: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MacroSink for CaptureSink {
        fn write_script(&self, script: &MacroScript) -> RepositoryResult<String> {
            if self.fail {
                return Err(RepositoryError::FileWriteError {
                    path: "/nope".to_string(),
                    message: "read-only".to_string(),
                });
            }
            self.written.lock().unwrap().push(script.render());
            Ok("/tmp/macro_final.mac".to_string())
        }
    }

    fn request(volume: &str) -> AllocationRequest {
        AllocationRequest {
            item_id: "4001".to_string(),
            warehouse: "10".to_string(),
            requested_volume: volume.to_string(),
            movement_ref: MovementRef::normalize("W001234"),
            class_code: Some("2".to_string()),
        }
    }

    fn allocation(address: &str) -> Allocation {
        Allocation {
            location: Location::new("10", address, Zone::Peq, 0.8),
            zone: Zone::Peq,
            required_height: 0.65,
        }
    }

    #[test]
    fn test_std_and_nstd_lines() {
        let std_line = MacroAssembler::build_line(&allocation("A1-02-03"), &request("50"), ItemClass::Std);
        assert_eq!(std_line.render(), "10[tab]W001234[tab][enter]A1-02-03[enter][pf6]");

        let nstd_line = MacroAssembler::build_line(&allocation("A1-02-03"), &request("50"), ItemClass::Nstd);
        assert_eq!(nstd_line.render(), "10[tab]W001234[tab][enter]A1-02-0350[enter][pf6]");
    }

    #[test]
    fn test_export_empty_buffer_writes_nothing() {
        let sink = Arc::new(CaptureSink::default());
        let assembler = MacroAssembler::new(sink.clone());
        let mut session = AllocationSession::new("u1", "U");

        assert!(matches!(assembler.export(&mut session), Err(ExportError::NothingToExport)));
        assert!(sink.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_export_then_reset() {
        let sink = Arc::new(CaptureSink::default());
        let assembler = MacroAssembler::new(sink.clone());
        let mut session = AllocationSession::new("u1", "U");

        for address in ["A-01", "A-02"] {
            session.record_location(address);
            MacroAssembler::append_macro(&mut session, &allocation(address), &request("5"), ItemClass::Std);
        }

        let outcome = assembler.export(&mut session).unwrap();
        assert_eq!(outcome.line_count, 2);
        assert!(session.locations_used().is_empty());
        assert!(session.macro_buffer().is_empty());

        let written = sink.written.lock().unwrap();
        assert!(written[0].contains("A-01[enter][pf6]10[tab]W001234[tab][enter]A-02[enter][pf6]"));
    }

    #[test]
    fn test_failed_write_keeps_buffer() {
        let sink = Arc::new(CaptureSink {
            fail: true,
            ..CaptureSink::default()
        });
        let assembler = MacroAssembler::new(sink);
        let mut session = AllocationSession::new("u1", "U");
        session.record_location("A-01");
        MacroAssembler::append_macro(&mut session, &allocation("A-01"), &request("5"), ItemClass::Std);

        assert!(matches!(assembler.export(&mut session), Err(ExportError::Sink(_))));
        assert_eq!(session.macro_buffer().len(), 1);
        assert_eq!(session.locations_used().len(), 1);
    }
}
