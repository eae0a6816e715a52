// src/extractor/cleaner.rs

use log::debug;

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// 候选链接被丢弃的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionSkip {
    Empty,
    IllegalCharacter(char),
    /// `(` 多于 `)`，通常是从标记中截断出来的
    UnbalancedParen,
}

/// 清理候选链接末尾由文本或标记带入的多余字符。
///
/// 重复执行下列步骤直到结果不再变化：
/// 1. 去掉末尾的句读符号 `.,;:!?`
/// 2. 若 `)` 多于 `(`，去掉末尾一个未配对的 `)`
/// 3. 去掉末尾一个引号
///
/// 配对的括号不会被去掉。
pub fn clean_url(raw: &str) -> Result<&str, ExtractionSkip> {
    let mut url = raw.trim();
    loop {
        let before = url.len();

        url = url.trim_end_matches(TRAILING_PUNCTUATION);
        if url.ends_with(')') && url.matches('(').count() < url.matches(')').count() {
            url = &url[..url.len() - 1];
        }
        if let Some(stripped) = url.strip_suffix(['"', '\'']) {
            url = stripped;
        }

        if url.len() == before {
            break;
        }
    }

    if url.is_empty() {
        return Err(ExtractionSkip::Empty);
    }
    // 清理后的链接必须能作为独立的裸链接再次被识别
    if let Some(c) = url.chars().find(|c| !is_token_char(*c)) {
        debug!("丢弃候选链接 '{}': 含有非法字符 {:?}", raw, c);
        return Err(ExtractionSkip::IllegalCharacter(c));
    }
    if url.matches('(').count() > url.matches(')').count() {
        return Err(ExtractionSkip::UnbalancedParen);
    }
    Ok(url)
}

/// 裸链接中允许出现的字符
fn is_token_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '<' | '>' | '"' | '\'' | '[' | ']')
}
