// ==========================================
// 仓储收货定位系统 - 外部查询重试层
// ==========================================
// 策略:
// - 每次调用最多 max_attempts 次
// - 认证被拒/账户锁定（按错误签名识别）→ 立即返回 AuthenticationError，不再重试
// - 其他错误视为瞬时错误 → 固定退避后重试；耗尽后按“无结果”返回并记录日志
// ==========================================

use crate::domain::location::Location;
use crate::domain::receipt::{ReceiptQuery, ReceiptRecord};
use crate::domain::types::Zone;
use crate::domain::user::Credentials;
use crate::inventory::{BackendError, InventoryBackend, LocationQuery};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// 默认最大尝试次数
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// 默认退避间隔（毫秒）
pub const DEFAULT_BACKOFF_MS: u64 = 2_000;

/// 默认认证错误签名（iSeries Access 错误码）
pub const DEFAULT_AUTH_SIGNATURES: &str = "CWBSY0002=PASSWORD_REJECTED,CWBSY0011=ACCOUNT_LOCKED";

// ==========================================
// 认证失败分类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthFailureKind {
    PasswordRejected, // 密码错误
    AccountLocked,    // 账户锁定/停用
    Rejected,         // 其他认证拒绝
}

impl AuthFailureKind {
    fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PASSWORD_REJECTED" => AuthFailureKind::PasswordRejected,
            "ACCOUNT_LOCKED" => AuthFailureKind::AccountLocked,
            _ => AuthFailureKind::Rejected,
        }
    }
}

impl fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailureKind::PasswordRejected => write!(f, "PASSWORD_REJECTED"),
            AuthFailureKind::AccountLocked => write!(f, "ACCOUNT_LOCKED"),
            AuthFailureKind::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// 错误签名 → 认证失败类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSignature {
    pub code: String,
    pub kind: AuthFailureKind,
}

/// 解析签名配置
///
/// 格式: `CODE=KIND,CODE=KIND`；省略 `=KIND` 时视为通用拒绝
pub fn parse_auth_signatures(raw: &str) -> Vec<AuthSignature> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((code, kind)) => AuthSignature {
                code: code.trim().to_string(),
                kind: AuthFailureKind::parse(kind),
            },
            None => AuthSignature {
                code: entry.to_string(),
                kind: AuthFailureKind::Rejected,
            },
        })
        .filter(|sig| !sig.code.is_empty())
        .collect()
}

/// 认证失败（致命，不重试）
#[derive(Error, Debug, Clone, PartialEq)]
#[error("外部系统认证失败 ({kind}, {signature}): {message}")]
pub struct AuthenticationError {
    pub kind: AuthFailureKind,
    pub signature: String,
    pub message: String,
}

// ==========================================
// RetryPolicy - 重试策略
// ==========================================
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub auth_signatures: Vec<AuthSignature>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            auth_signatures: parse_auth_signatures(DEFAULT_AUTH_SIGNATURES),
        }
    }
}

impl RetryPolicy {
    /// 识别认证类错误；返回 None 表示瞬时错误
    pub fn classify(&self, err: &BackendError) -> Option<AuthenticationError> {
        let message = err.message();
        self.auth_signatures
            .iter()
            .find(|sig| message.contains(&sig.code))
            .map(|sig| AuthenticationError {
                kind: sig.kind,
                signature: sig.code.clone(),
                message: message.to_string(),
            })
    }
}

// ==========================================
// ResilientQueryLayer
// ==========================================
pub struct ResilientQueryLayer {
    backend: Arc<dyn InventoryBackend>,
    policy: RetryPolicy,
    transient_failures: AtomicU64,
}

impl ResilientQueryLayer {
    pub fn new(backend: Arc<dyn InventoryBackend>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            transient_failures: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 累计瞬时失败次数（每次触发重试或耗尽的失败计一次）
    pub fn transient_failure_count(&self) -> u64 {
        self.transient_failures.load(Ordering::Relaxed)
    }

    /// 查询某区域内最合适的空闲库位
    pub async fn query_location(
        &self,
        credentials: &Credentials,
        zone: Zone,
        warehouse: &str,
        excluded: &[String],
        required_height: f64,
    ) -> Result<Option<Location>, AuthenticationError> {
        let query = LocationQuery {
            zone,
            warehouse: warehouse.to_string(),
            excluded: excluded.to_vec(),
            min_height: required_height,
        };

        tracing::info!(
            zone = %zone,
            warehouse,
            min_height = required_height,
            excluded = excluded.len(),
            "查询空闲库位"
        );

        let backend = &self.backend;
        let q = &query;
        self.run_with_retry("find_free_location", || backend.find_free_location(credentials, q))
            .await
    }

    /// 核对收货单
    pub async fn verify_receipt(
        &self,
        credentials: &Credentials,
        query: &ReceiptQuery,
    ) -> Result<Option<ReceiptRecord>, AuthenticationError> {
        let backend = &self.backend;
        self.run_with_retry("find_receipt", || backend.find_receipt(credentials, query))
            .await
    }

    async fn run_with_retry<T, F, Fut>(
        &self,
        operation: &str,
        mut op: F,
    ) -> Result<Option<T>, AuthenticationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, BackendError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if let Some(auth_err) = self.policy.classify(&err) {
                tracing::error!(
                    operation,
                    attempt,
                    kind = %auth_err.kind,
                    signature = %auth_err.signature,
                    "外部系统认证失败，停止重试"
                );
                return Err(auth_err);
            }

            self.transient_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                operation,
                attempt,
                max_attempts,
                error = %err,
                "外部查询失败"
            );

            if attempt < max_attempts && !self.policy.backoff.is_zero() {
                tokio::time::sleep(self.policy.backoff).await;
            }
        }

        tracing::error!(operation, max_attempts, "外部查询重试耗尽，按无结果处理");
        Ok(None)
    }
}
