// ==========================================
// 仓储收货定位系统 - 收货定位 API
// ==========================================
// consult: 单号归一化 → 尺寸完整性 → 核对收货单 → 分配库位 → 打印标签 → 追加宏行
// export : 宏缓冲区写入 macro_final.mac，成功后清空会话
// peek   : 按 (区域, 仓库) 查看最优空闲地址，不改变会话
// ==========================================

use std::sync::Arc;

use crate::api::dto::{ApiResponse, ConsultRequest, ExportResponse, PeekLocationRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::session_store::{SessionStore, SharedSession};
use crate::domain::location::{AllocationRequest, MovementRef};
use crate::domain::receipt::ReceiptQuery;
use crate::domain::session::AllocationSession;
use crate::domain::types::{ItemClass, Zone};
use crate::domain::user::Credentials;
use crate::engine::{MacroAssembler, SlotAllocationEngine};
use crate::i18n::{t, t_with_args};
use crate::printing::{LabelContext, LabelService};
use crate::repository::{
    AllocationAction, AllocationLogEntry, AllocationLogRepository, ItemCubageRepository,
    UserRepository,
};

/// 数量解析（接受逗号小数点）
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

pub struct ReceivingApi {
    engine: Arc<SlotAllocationEngine>,
    assembler: Arc<MacroAssembler>,
    labels: Arc<LabelService>,
    sessions: Arc<SessionStore>,
    user_repo: Arc<UserRepository>,
    item_repo: Arc<ItemCubageRepository>,
    log_repo: Arc<AllocationLogRepository>,
}

impl ReceivingApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Arc<SlotAllocationEngine>,
        assembler: Arc<MacroAssembler>,
        labels: Arc<LabelService>,
        sessions: Arc<SessionStore>,
        user_repo: Arc<UserRepository>,
        item_repo: Arc<ItemCubageRepository>,
        log_repo: Arc<AllocationLogRepository>,
    ) -> Self {
        Self {
            engine,
            assembler,
            labels,
            sessions,
            user_repo,
            item_repo,
            log_repo,
        }
    }

    fn session(&self, session_id: &str) -> ApiResult<SharedSession> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| ApiError::SessionExpired(session_id.to_string()))
    }

    fn credentials_for(&self, session: &AllocationSession) -> ApiResult<Credentials> {
        self.user_repo
            .find_by_id(session.user_id())?
            .map(|u| u.credentials())
            .ok_or_else(|| ApiError::SessionExpired(session.session_id().to_string()))
    }

    /// 审计日志写入失败不影响业务结果
    fn audit(&self, entry: AllocationLogEntry) {
        if let Err(e) = self.log_repo.insert(&entry) {
            tracing::warn!(error = %e, action = %entry.action_type, "审计日志写入失败");
        }
    }

    fn into_response(result: ApiResult<ApiResponse>, operation: &str) -> ApiResponse {
        match result {
            Ok(response) => response,
            Err(err) => {
                if err.is_unexpected() {
                    tracing::error!(operation, error = %err, "非预期错误");
                } else {
                    tracing::warn!(operation, code = err.error_code(), error = %err, "请求失败");
                }
                ApiResponse::from_error(&err)
            }
        }
    }

    // ==========================================
    // consult
    // ==========================================

    /// 收货定位（JSON 风格响应）
    pub async fn consult(&self, session_id: &str, request: ConsultRequest) -> ApiResponse {
        match self.try_consult(session_id, request).await {
            Err(err) if err.is_unexpected() => {
                tracing::error!(error = %err, "收货定位出现非预期错误");
                ApiResponse {
                    message: Some(t("consult.unexpected")),
                    ..ApiResponse::from_error(&err)
                }
            }
            result => Self::into_response(result, "consult"),
        }
    }

    pub async fn try_consult(&self, session_id: &str, request: ConsultRequest) -> ApiResult<ApiResponse> {
        let shared = self.session(session_id)?;

        // ===== 输入校验（不改变任何状态）=====
        let item_id = request.item_id.trim().to_string();
        if item_id.is_empty() || request.warehouse.trim().is_empty() {
            return Err(ApiError::InvalidInput("item/warehouse 不能为空".to_string()));
        }
        let movement_ref = MovementRef::normalize(&request.movement_ref);

        let (qud, volume) = match (parse_decimal(&request.qud), parse_decimal(&request.volume)) {
            (Some(q), Some(v)) => (q, v),
            _ => {
                return Err(ApiError::InvalidQuantity(format!(
                    "qud={:?}, volume={:?}",
                    request.qud, request.volume
                )))
            }
        };

        let printer_id = request.printer_id.trim().to_string();
        self.labels.resolve(&printer_id)?;

        // 同一会话的请求串行执行
        let mut session = shared.lock().await;

        // ===== 尺寸完整性 =====
        let dims = self.item_repo.find_by_item(&item_id)?;
        match dims {
            Some(ref d) if d.is_complete() => {}
            Some(d) => {
                return Err(ApiError::IncompleteItem {
                    item_id,
                    missing: d.missing_fields(),
                })
            }
            None => {
                return Err(ApiError::IncompleteItem {
                    item_id,
                    missing: vec!["length", "width", "height", "cubic_volume", "units_per_layer"],
                })
            }
        }

        let credentials = self.credentials_for(&session)?;

        // ===== 核对收货单 =====
        let receipt_query = ReceiptQuery {
            item_id: item_id.clone(),
            lot: request.lot.trim().to_string(),
            movement_ref: movement_ref.as_str().to_string(),
            quantity: qud * volume,
            warehouse: request.warehouse.trim().to_string(),
        };
        let receipt = self
            .engine
            .query_layer()
            .verify_receipt(&credentials, &receipt_query)
            .await?
            .ok_or_else(|| {
                ApiError::ReceiptMismatch(format!(
                    "item={}, lot={}, mov={}, qty={}",
                    receipt_query.item_id,
                    receipt_query.lot,
                    receipt_query.movement_ref,
                    receipt_query.quantity_key()
                ))
            })?;

        // ===== 分配库位 =====
        let allocation_request = AllocationRequest {
            item_id: item_id.clone(),
            warehouse: receipt_query.warehouse.clone(),
            requested_volume: request.volume.trim().to_string(),
            movement_ref: movement_ref.clone(),
            class_code: receipt.class_code.clone(),
        };
        let allocation = self
            .engine
            .allocate(&allocation_request, &mut session, &credentials)
            .await?;
        let address = allocation.location.address.clone();

        // ===== 打印标签 =====
        let context = LabelContext {
            zone: allocation.zone,
            movement_ref: movement_ref.as_str().to_string(),
            upin: session.upin().to_string(),
        };
        if let Err(print_err) = self
            .labels
            .print_labels(&printer_id, std::slice::from_ref(&address), &context)
            .await
        {
            // 库位保留在排除集中，但不生成宏行
            let mut entry = AllocationLogEntry::new(session.session_id(), session.user_id(), AllocationAction::PrintFailed);
            entry.warehouse = Some(allocation_request.warehouse.clone());
            entry.address = Some(address.clone());
            entry.zone = Some(allocation.zone.code().to_string());
            entry.item_id = Some(item_id.clone());
            entry.movement_ref = Some(movement_ref.as_str().to_string());
            entry.detail = Some(print_err.to_string());
            self.audit(entry);
            return Err(print_err.into());
        }

        // ===== 追加宏行 =====
        let item_class = ItemClass::from_class_code(receipt.class_code.as_deref());
        MacroAssembler::append_macro(&mut session, &allocation, &allocation_request, item_class);

        let mut entry = AllocationLogEntry::new(session.session_id(), session.user_id(), AllocationAction::Allocate);
        entry.warehouse = Some(allocation_request.warehouse.clone());
        entry.address = Some(address.clone());
        entry.zone = Some(allocation.zone.code().to_string());
        entry.item_id = Some(item_id);
        entry.movement_ref = Some(movement_ref.as_str().to_string());
        entry.detail = Some(format!(
            "class={}, required_height={:.2}",
            item_class, allocation.required_height
        ));
        self.audit(entry);

        Ok(ApiResponse::with_address(address, t("consult.added")))
    }

    // ==========================================
    // export
    // ==========================================

    /// 导出宏脚本
    pub async fn export(&self, session_id: &str) -> ApiResult<ExportResponse> {
        let shared = self.session(session_id)?;
        let mut session = shared.lock().await;
        let session_ref = session.session_id().to_string();
        let user_id = session.user_id().to_string();

        let outcome = match self.assembler.export(&mut session) {
            Ok(outcome) => outcome,
            Err(e) => {
                let err: ApiError = e.into();
                if !matches!(err, ApiError::NothingToExport) {
                    tracing::error!(session_id = %session_ref, error = %err, "宏导出失败");
                }
                return Err(err);
            }
        };

        let mut entry = AllocationLogEntry::new(&session_ref, &user_id, AllocationAction::Export);
        entry.detail = Some(format!("path={}, lines={}", outcome.path, outcome.line_count));
        self.audit(entry);

        Ok(ExportResponse {
            success: true,
            message: t_with_args("export.saved", &[("path", &outcome.path)]),
            path: Some(outcome.path),
            line_count: outcome.line_count,
        })
    }

    // ==========================================
    // peek
    // ==========================================

    /// 查看某区域最优空闲地址（无高度下限，不排除、不记录）
    pub async fn peek_location(&self, session_id: &str, request: PeekLocationRequest) -> ApiResponse {
        let result = self.try_peek_location(session_id, request).await;
        Self::into_response(result, "peek_location")
    }

    async fn try_peek_location(
        &self,
        session_id: &str,
        request: PeekLocationRequest,
    ) -> ApiResult<ApiResponse> {
        if request.zone.trim().is_empty() || request.warehouse.trim().is_empty() {
            return Err(ApiError::InvalidInput(t("location.missing_params")));
        }
        let zone: Zone = request.zone.parse().map_err(ApiError::InvalidInput)?;

        let credentials = {
            let shared = self.session(session_id)?;
            let session = shared.lock().await;
            self.credentials_for(&session)?
        };

        let found = self
            .engine
            .query_layer()
            .query_location(&credentials, zone, request.warehouse.trim(), &[], 0.0)
            .await?;

        match found {
            Some(location) => Ok(ApiResponse::with_address(location.address, t("common.success"))),
            None => Ok(ApiResponse {
                success: false,
                address: None,
                message: Some(t("location.none_available")),
                error_code: Some("NO_LOCATION_AVAILABLE".to_string()),
            }),
        }
    }
}
