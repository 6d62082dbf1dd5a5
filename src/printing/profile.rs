// ==========================================
// 仓储收货定位系统 - 打印机型号
// ==========================================
// 货架区 (PEQ/MED/GRA) 与通道区 (RUA) 使用不同的边距与字宽
// ==========================================

use crate::printing::{encode_latin1, LabelContext, PrintError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 打印机型号能力
pub trait PrinterProfile: Send + Sync {
    fn device_id(&self) -> &str;

    fn host(&self) -> &str;

    /// 渲染单张标签（已编码为打印机字节）
    fn render(&self, address: &str, context: &LabelContext) -> Vec<u8>;
}

/// ZPL 版式参数
#[derive(Debug, Clone, PartialEq)]
pub struct ZplLabelProfile {
    pub device_id: String,
    pub host: String,
    pub rack_margin: u32,
    pub aisle_margin: u32,
    pub rack_length: u32,
    pub aisle_length: u32,
    pub qr_origin: (u32, u32),
    pub qr_scale: u32,
    pub base_font: u32,
    pub address_top: u32,
    pub address_height: u32,
    pub footer_top: u32,
    pub footer_font: u32,
    pub upin_origin: (u32, u32),
}

impl ZplLabelProfile {
    /// 大号标签机
    pub fn brteman01() -> Self {
        Self {
            device_id: "BRTEMAN01".to_string(),
            host: "169.6.169.230".to_string(),
            rack_margin: 30,
            aisle_margin: 25,
            rack_length: 190,
            aisle_length: 180,
            qr_origin: (500, 30),
            qr_scale: 4,
            base_font: 250,
            address_top: 135,
            address_height: 450,
            footer_top: 510,
            footer_font: 40,
            upin_origin: (500, 520),
        }
    }

    /// 小号标签机
    pub fn brteman02() -> Self {
        Self {
            device_id: "BRTEMAN02".to_string(),
            host: "169.6.169.208".to_string(),
            rack_margin: 20,
            aisle_margin: 20,
            rack_length: 140,
            aisle_length: 130,
            qr_origin: (350, 25),
            qr_scale: 3,
            base_font: 230,
            address_top: 110,
            address_height: 350,
            footer_top: 390,
            footer_font: 30,
            upin_origin: (350, 390),
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// 按区域取 (边距, 字宽)
    pub fn layout_for(&self, context: &LabelContext) -> (u32, u32) {
        if context.zone.is_rack() {
            (self.rack_margin, self.rack_length)
        } else {
            (self.aisle_margin, self.aisle_length)
        }
    }

    /// ZPL 文本
    pub fn render_zpl(&self, address: &str, context: &LabelContext) -> String {
        let (margin, length) = self.layout_for(context);

        let mut zpl = String::new();
        zpl.push_str("^XA\n^PRC\n");
        zpl.push_str(&format!(
            "^FO{},{}^BQ0N,{},{}^FDQA,{}^FS\n",
            self.qr_origin.0, self.qr_origin.1, self.qr_scale, self.qr_scale, address
        ));
        zpl.push_str(&format!("^CF0,{}\n", self.base_font));
        zpl.push_str(&format!(
            "^FO{},{}^A0N,{},{}^FD{}^FS\n",
            margin, self.address_top, self.address_height, length, address
        ));
        zpl.push_str("^CFC,25\n");
        zpl.push_str(&format!(
            "^FO30,{}^A0N,{},{}^FDW{}^FS\n",
            self.footer_top, self.footer_font, self.footer_font, context.movement_ref
        ));
        zpl.push_str(&format!(
            "^FO{},{}^FD{}^FS\n",
            self.upin_origin.0, self.upin_origin.1, context.upin
        ));
        zpl.push_str("^XZ\n");
        zpl
    }
}

impl PrinterProfile for ZplLabelProfile {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn render(&self, address: &str, context: &LabelContext) -> Vec<u8> {
        encode_latin1(&self.render_zpl(address, context))
    }
}

// ==========================================
// PrinterRegistry - 按设备号查找
// ==========================================
#[derive(Clone)]
pub struct PrinterRegistry {
    profiles: BTreeMap<String, Arc<dyn PrinterProfile>>,
}

impl Default for PrinterRegistry {
    fn default() -> Self {
        Self::with_profiles(vec![
            Arc::new(ZplLabelProfile::brteman01()),
            Arc::new(ZplLabelProfile::brteman02()),
        ])
    }
}

impl PrinterRegistry {
    pub fn with_profiles(profiles: Vec<Arc<dyn PrinterProfile>>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.device_id().to_string(), p))
                .collect(),
        }
    }

    /// 设备号大小写不敏感
    pub fn get(&self, device_id: &str) -> Result<Arc<dyn PrinterProfile>, PrintError> {
        let key = device_id.trim().to_uppercase();
        self.profiles
            .get(&key)
            .cloned()
            .ok_or_else(|| PrintError::UnknownDevice(device_id.trim().to_string()))
    }

    pub fn device_ids(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Zone;

    fn ctx(zone: Zone) -> LabelContext {
        LabelContext {
            zone,
            movement_ref: "001234".to_string(),
            upin: "OPER1".to_string(),
        }
    }

    #[test]
    fn test_rack_and_aisle_layout() {
        let p = ZplLabelProfile::brteman01();
        assert_eq!(p.layout_for(&ctx(Zone::Med)), (30, 190));
        assert_eq!(p.layout_for(&ctx(Zone::Rua)), (25, 180));

        let zpl = p.render_zpl("A1-02-03", &ctx(Zone::Peq));
        assert!(zpl.starts_with("^XA\n^PRC\n"));
        assert!(zpl.contains("^FO500,30^BQ0N,4,4^FDQA,A1-02-03^FS"));
        assert!(zpl.contains("^FO30,135^A0N,450,190^FDA1-02-03^FS"));
        assert!(zpl.contains("^FDW001234^FS"));
        assert!(zpl.contains("^FO500,520^FDOPER1^FS"));
        assert!(zpl.ends_with("^XZ\n"));
    }

    #[test]
    fn test_small_printer_layout() {
        let zpl = ZplLabelProfile::brteman02().render_zpl("R-9", &ctx(Zone::Rua));
        assert!(zpl.contains("^FO350,25^BQ0N,3,3^FDQA,R-9^FS"));
        assert!(zpl.contains("^CF0,230"));
        assert!(zpl.contains("^FO20,110^A0N,350,130^FDR-9^FS"));
        assert!(zpl.contains("^FO30,390^A0N,30,30^FDW001234^FS"));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = PrinterRegistry::default();
        assert_eq!(registry.get("brteman02").unwrap().host(), "169.6.169.208");
        assert_eq!(
            registry.get("XPTO").err(),
            Some(PrintError::UnknownDevice("XPTO".to_string()))
        );
        assert_eq!(registry.device_ids(), vec!["BRTEMAN01", "BRTEMAN02"]);
    }
}
