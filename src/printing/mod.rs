// ==========================================
// 仓储收货定位系统 - 标签打印
// ==========================================
// 职责: 按打印机型号渲染 ZPL 标签并经 TCP 发送
// 约束: 不排队、不重试；连接失败直接返回给调用方
// ==========================================

pub mod profile;
pub mod sender;
pub mod service;

use crate::domain::types::Zone;
use thiserror::Error;

pub use profile::{PrinterProfile, PrinterRegistry, ZplLabelProfile};
pub use sender::{LabelSender, TcpLabelSender};
pub use service::LabelService;

/// 标签内容上下文（地址之外的字段）
#[derive(Debug, Clone, PartialEq)]
pub struct LabelContext {
    pub zone: Zone,
    pub movement_ref: String,
    pub upin: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrintError {
    #[error("未知打印机: {0}")]
    UnknownDevice(String),

    #[error("连接打印机失败 ({host}): {message}")]
    Connection { host: String, message: String },
}

/// 转为 ISO-8859-1 字节；超出范围的字符以 '?' 代替
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}
