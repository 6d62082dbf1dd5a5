// ==========================================
// 仓储收货定位系统 - 标签发送
// ==========================================
// 原始 TCP（RAW 9100）；一次连接发送全部标签
// ==========================================

use crate::printing::PrintError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const DEFAULT_PRINTER_PORT: u16 = 9100;
pub const DEFAULT_PRINTER_TIMEOUT_MS: u64 = 5_000;

#[async_trait]
pub trait LabelSender: Send + Sync {
    async fn send(&self, host: &str, labels: &[Vec<u8>]) -> Result<(), PrintError>;
}

pub struct TcpLabelSender {
    port: u16,
    timeout: Duration,
}

impl Default for TcpLabelSender {
    fn default() -> Self {
        Self::new(DEFAULT_PRINTER_PORT, Duration::from_millis(DEFAULT_PRINTER_TIMEOUT_MS))
    }
}

impl TcpLabelSender {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    async fn send_all(&self, host: &str, labels: &[Vec<u8>]) -> std::io::Result<()> {
        let mut stream = TcpStream::connect((host, self.port)).await?;
        for label in labels {
            stream.write_all(label).await?;
        }
        stream.flush().await?;
        stream.shutdown().await
    }
}

#[async_trait]
impl LabelSender for TcpLabelSender {
    async fn send(&self, host: &str, labels: &[Vec<u8>]) -> Result<(), PrintError> {
        let connection_error = |message: String| PrintError::Connection {
            host: format!("{}:{}", host, self.port),
            message,
        };

        match timeout(self.timeout, self.send_all(host, labels)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(connection_error(e.to_string())),
            Err(_) => Err(connection_error(format!("超时 {:?}", self.timeout))),
        }
    }
}
