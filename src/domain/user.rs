// ==========================================
// 仓储收货定位系统 - 操作员用户
// ==========================================
// 对齐: operator_user 表
// upin/secret 为外部库存系统 (BPCS) 的登录凭据
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorUser {
    pub id: String,
    pub upin: String,
    pub secret: String,
    pub name: Option<String>,
}

impl OperatorUser {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            upin: self.upin.clone(),
            secret: self.secret.clone(),
        }
    }
}

// ==========================================
// Credentials - 外部系统凭据
// ==========================================
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub upin: String,
    pub secret: String,
}

// 日志中不输出密码
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("upin", &self.upin)
            .field("secret", &"***")
            .finish()
    }
}
