// ==========================================
// 仓储收货定位系统 - 标签打印服务
// ==========================================

use crate::printing::profile::{PrinterProfile, PrinterRegistry};
use crate::printing::sender::LabelSender;
use crate::printing::{LabelContext, PrintError};
use std::sync::Arc;

pub struct LabelService {
    registry: PrinterRegistry,
    sender: Arc<dyn LabelSender>,
}

impl LabelService {
    pub fn new(registry: PrinterRegistry, sender: Arc<dyn LabelSender>) -> Self {
        Self { registry, sender }
    }

    /// 校验设备号（定位前调用，未知设备不改变任何状态）
    pub fn resolve(&self, device_id: &str) -> Result<Arc<dyn PrinterProfile>, PrintError> {
        self.registry.get(device_id)
    }

    pub fn registry(&self) -> &PrinterRegistry {
        &self.registry
    }

    /// 为每个地址打印一张标签；地址为空时不连接打印机
    pub async fn print_labels(
        &self,
        device_id: &str,
        addresses: &[String],
        context: &LabelContext,
    ) -> Result<(), PrintError> {
        if addresses.is_empty() {
            return Ok(());
        }

        let profile = self.resolve(device_id)?;
        let labels: Vec<Vec<u8>> = addresses
            .iter()
            .map(|address| profile.render(address, context))
            .collect();

        match self.sender.send(profile.host(), &labels).await {
            Ok(()) => {
                tracing::info!(
                    device = profile.device_id(),
                    count = labels.len(),
                    zone = %context.zone,
                    "标签已发送"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(device = profile.device_id(), error = %e, "标签打印失败");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Zone;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl LabelSender for RecordingSender {
        async fn send(&self, host: &str, labels: &[Vec<u8>]) -> Result<(), PrintError> {
            self.sent.lock().unwrap().push((host.to_string(), labels.len()));
            Ok(())
        }
    }

    fn ctx() -> LabelContext {
        LabelContext {
            zone: Zone::Gra,
            movement_ref: "001234".to_string(),
            upin: "OPER1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_print_routes_to_profile_host() {
        let sender = Arc::new(RecordingSender::default());
        let service = LabelService::new(PrinterRegistry::default(), sender.clone());

        service
            .print_labels("BRTEMAN01", &["A-01".to_string(), "A-02".to_string()], &ctx())
            .await
            .unwrap();
        service.print_labels("BRTEMAN02", &[], &ctx()).await.unwrap();

        assert_eq!(
            *sender.sent.lock().unwrap(),
            vec![("169.6.169.230".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let sender = Arc::new(RecordingSender::default());
        let service = LabelService::new(PrinterRegistry::default(), sender.clone());

        let err = service
            .print_labels("NOPE", &["A-01".to_string()], &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, PrintError::UnknownDevice(_)));
        assert!(sender.sent.lock().unwrap().is_empty());
    }
}
