// ==========================================
// 仓储收货定位系统 - 终端自动化宏模型
// ==========================================
// 宏行 = 有序按键令牌列表，导出时一次性序列化
// [tab] / [enter] / [pf6] 为终端自动化工具的按键记号，必须原样输出
// ==========================================

use serde::{Deserialize, Serialize};

/// 导出文件名（每次导出覆盖，最后一次为准）
pub const MACRO_FILE_NAME: &str = "macro_final.mac";

const ENVELOPE_HEAD: &str = concat!(
    r#"<HAScript name="Macro">"#,
    r#"<screen name="MainScreen" entryscreen="true">"#,
    r#"<description></description>"#,
    r#"<actions><input value=""#,
);

const ENVELOPE_TAIL: &str = concat!(
    r#""/></actions>"#,
    r#"<nextscreens timeout="0" ><nextscreen name="EndScreen" /></nextscreens>"#,
    r#"</screen>"#,
    r#"<screen name="EndScreen" exitscreen="true">"#,
    r#"<description></description><actions></actions>"#,
    r#"<nextscreens timeout="0" ></nextscreens>"#,
    r#"</screen>"#,
    r#"</HAScript>"#,
);

// ==========================================
// Keystroke - 按键令牌
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keystroke {
    Text(String),
    Tab,
    Enter,
    Pf6,
}

impl Keystroke {
    fn write_to(&self, out: &mut String) {
        match self {
            Keystroke::Text(text) => push_escaped(out, text),
            Keystroke::Tab => out.push_str("[tab]"),
            Keystroke::Enter => out.push_str("[enter]"),
            Keystroke::Pf6 => out.push_str("[pf6]"),
        }
    }
}

/// 文本令牌写入 input 属性值：转义属性分隔符，按键记号不受影响
fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

// ==========================================
// MacroLine - 单条定位对应的宏行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MacroLine {
    keys: Vec<Keystroke>,
}

impl MacroLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.keys.push(Keystroke::Text(text.into()));
        self
    }

    pub fn key(mut self, key: Keystroke) -> Self {
        self.keys.push(key);
        self
    }

    pub fn keys(&self) -> &[Keystroke] {
        &self.keys
    }

    /// 序列化为终端记号文本
    pub fn render(&self) -> String {
        let mut out = String::new();
        for key in &self.keys {
            key.write_to(&mut out);
        }
        out
    }
}

// ==========================================
// MacroScript - 导出的完整宏
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroScript {
    lines: Vec<MacroLine>,
}

impl MacroScript {
    pub fn new(lines: Vec<MacroLine>) -> Self {
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 按固定双屏封套序列化（行与行之间无分隔符）
    pub fn render(&self) -> String {
        let mut out = String::from(ENVELOPE_HEAD);
        for line in &self.lines {
            for key in line.keys() {
                key.write_to(&mut out);
            }
        }
        out.push_str(ENVELOPE_TAIL);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_render() {
        let line = MacroLine::new()
            .text("10")
            .key(Keystroke::Tab)
            .text("W001234")
            .key(Keystroke::Tab)
            .key(Keystroke::Enter)
            .text("A1-02-03")
            .key(Keystroke::Enter)
            .key(Keystroke::Pf6);
        assert_eq!(line.render(), "10[tab]W001234[tab][enter]A1-02-03[enter][pf6]");
    }

    #[test]
    fn test_script_envelope() {
        let script = MacroScript::new(vec![
            MacroLine::new().text("A").key(Keystroke::Enter),
            MacroLine::new().text("B").key(Keystroke::Pf6),
        ]);
        let rendered = script.render();

        assert!(rendered.starts_with(r#"<HAScript name="Macro"><screen name="MainScreen" entryscreen="true">"#));
        assert!(rendered.contains(r#"<actions><input value="A[enter]B[pf6]"/></actions>"#));
        assert!(rendered.ends_with("</screen></HAScript>"));
        assert_eq!(script.line_count(), 2);
    }

    #[test]
    fn test_text_is_escaped_inside_attribute() {
        let line = MacroLine::new().text(r#"A"1&<"#);
        assert_eq!(line.render(), "A&quot;1&amp;&lt;");
    }
}
