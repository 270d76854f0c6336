//! LLM 输出文本清理

use regex::Regex;
use std::sync::OnceLock;

static CODE_FENCE: OnceLock<Regex> = OnceLock::new();
static XML_PROLOG: OnceLock<Regex> = OnceLock::new();

/// 去掉包裹 JSON 的 markdown 代码块（```json ... ```）
pub fn strip_code_fence(text: &str) -> &str {
    let re = CODE_FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```\s*$").expect("代码块正则无效")
    });
    match re.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// 去掉 SVG 前面的 `<?xml ...?>` 声明
pub fn strip_xml_prolog(svg: &str) -> String {
    let re = XML_PROLOG.get_or_init(|| Regex::new(r"(?s)<\?xml.*?\?>").expect("XML 声明正则无效"));
    re.replace_all(svg, "").trim().to_string()
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
