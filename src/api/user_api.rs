// ==========================================
// 仓储收货定位系统 - 操作员用户 API
// ==========================================
// 职责: 登录/注销/登录状态/用户核对/用户保存
// ==========================================

use std::sync::Arc;

use crate::api::dto::{LoginResponse, LoginStatus, SaveUserRequest, UserInfo};
use crate::api::error::{ApiError, ApiResult};
use crate::api::session_store::SessionStore;
use crate::domain::user::OperatorUser;
use crate::i18n::t;
use crate::repository::{
    AllocationAction, AllocationLogEntry, AllocationLogRepository, SaveUserOutcome, UserRepository,
};

pub struct UserApi {
    user_repo: Arc<UserRepository>,
    sessions: Arc<SessionStore>,
    log_repo: Arc<AllocationLogRepository>,
}

impl UserApi {
    pub fn new(
        user_repo: Arc<UserRepository>,
        sessions: Arc<SessionStore>,
        log_repo: Arc<AllocationLogRepository>,
    ) -> Self {
        Self {
            user_repo,
            sessions,
            log_repo,
        }
    }

    /// 登录：查找用户并开启新会话（替换该用户的旧会话）
    pub fn login(&self, user_id: &str) -> ApiResult<LoginResponse> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ApiError::InvalidInput(t("session.user_not_found")));
        }

        let user = self
            .user_repo
            .find_by_id(user_id)?
            .ok_or_else(|| ApiError::NotFound(t("session.user_not_found")))?;

        let session_id = self.sessions.open(&user.id, &user.upin);
        tracing::info!(user_id = %user.id, session_id = %session_id, "操作员登录");

        Ok(LoginResponse {
            session_id,
            user_id: user.id,
            name: user.name,
        })
    }

    /// 注销：清空并丢弃会话状态
    pub async fn logout(&self, session_id: &str) -> ApiResult<()> {
        let session = self
            .sessions
            .close(session_id)
            .ok_or_else(|| ApiError::SessionExpired(session_id.to_string()))?;

        let mut guard = session.lock().await;
        let summary = guard.summary();
        guard.reset();
        drop(guard);

        let mut entry = AllocationLogEntry::new(&summary.session_id, &summary.user_id, AllocationAction::Logout);
        entry.detail = Some(format!(
            "discarded locations={}, macros={}",
            summary.locations_used, summary.macro_count
        ));
        if let Err(e) = self.log_repo.insert(&entry) {
            tracing::warn!(error = %e, "审计日志写入失败");
        }

        tracing::info!(
            session_id = %summary.session_id,
            user_id = %summary.user_id,
            discarded_macros = summary.macro_count,
            "操作员注销"
        );
        Ok(())
    }

    /// 登录状态
    pub async fn status(&self, session_id: &str) -> LoginStatus {
        match self.sessions.get(session_id) {
            Some(session) => LoginStatus {
                logged_in: true,
                session: Some(session.lock().await.summary()),
            },
            None => LoginStatus {
                logged_in: false,
                session: None,
            },
        }
    }

    /// 核对用户是否存在（不返回密码）
    pub fn verify_user(&self, user_id: &str) -> ApiResult<Option<UserInfo>> {
        Ok(self.user_repo.find_by_id(user_id.trim())?.map(|u| UserInfo {
            id: u.id,
            upin: u.upin,
            name: u.name,
        }))
    }

    /// 保存用户：不存在则创建，存在则更新密码
    pub fn save_user(&self, request: SaveUserRequest) -> ApiResult<SaveUserOutcome> {
        let id = request.id.trim();
        if id.is_empty() || request.upin.trim().is_empty() || request.secret.is_empty() {
            return Err(ApiError::InvalidInput("id/upin/secret 不能为空".to_string()));
        }

        let user = OperatorUser {
            id: id.to_string(),
            upin: request.upin.trim().to_uppercase(),
            secret: request.secret,
            name: request.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        };

        let outcome = self.user_repo.save(&user)?;
        tracing::info!(user_id = %user.id, outcome = outcome.as_str(), "用户已保存");
        Ok(outcome)
    }
}
