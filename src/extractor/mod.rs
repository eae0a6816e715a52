// src/extractor/mod.rs

//! 从任意文本 (纯文本、HTML、Markdown) 中提取 Yandex.Disk 分享链接。
//!
//! 纯文本变换，不访问网络或文件系统。

pub mod cleaner;

use crate::models::ShareLink;
use itertools::Itertools;
use log::{debug, info};
use regex::Regex;
use std::sync::LazyLock;

/// `<a ... href="...">` 中的链接
static ANCHOR_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s+[^>]*href\s*=\s*["'](https?://[^"']*(?:yandex|yadi\.sk)[^"']*)["'][^>]*>"#)
        .unwrap()
});
/// Markdown 形式的 `[标题](链接)`，链接内允许一层配对的括号
static MARKDOWN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\[[^\]]*\]\((https?://(?:[^()\s]|\([^()\s]*\))*(?:yandex|yadi\.sk)(?:[^()\s]|\([^()\s]*\))*)\)"#,
    )
    .unwrap()
});
/// 以空白、引号、尖括号或方括号分隔的裸链接
static BARE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"'\[\]]*(?:yandex|yadi\.sk)[^\s<>"'\[\]]*"#).unwrap()
});

/// 提取、清理并去重文本中的分享链接。
///
/// 输入会先做 HTML 实体解码，然后依次用三种模式匹配：
/// HTML 锚点、Markdown 链接、裸链接。结果按"锚点 → Markdown → 裸链接"
/// 各自首次出现的顺序排列，**不保证**与链接在原文中的顺序一致。
pub fn extract_links(text: &str) -> Vec<ShareLink> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let decoded = decode_entities_fully(text);

    let captured = [&*ANCHOR_HREF_RE, &*MARKDOWN_LINK_RE]
        .into_iter()
        .flat_map(|re| {
            re.captures_iter(&decoded)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
        });
    let bare = BARE_URL_RE.find_iter(&decoded).map(|m| m.as_str());

    // 相同的原始匹配只清理一次
    let links: Vec<ShareLink> = captured
        .chain(bare)
        .unique()
        .filter_map(|raw| match cleaner::clean_url(raw) {
            Ok(cleaned) => Some(cleaned),
            Err(skip) => {
                debug!("跳过候选链接 '{}': {:?}", raw, skip);
                None
            }
        })
        .filter(|cleaned| {
            // 仍含实体的候选在下一次提取时会被解码成另一个链接
            let stable = html_escape::decode_html_entities(cleaned) == *cleaned;
            if !stable {
                debug!("丢弃含 HTML 实体的候选链接 '{}'", cleaned);
            }
            stable
        })
        .filter_map(|cleaned| {
            let link = ShareLink::parse(cleaned);
            if link.is_none() {
                debug!("候选链接 '{}' 未通过域名校验", cleaned);
            }
            link
        })
        .unique()
        .collect();

    info!("从 {} 字节文本中提取到 {} 个链接", text.len(), links.len());
    links
}

/// 反复解码 HTML 实体直到文本不再变化，`&amp;amp;` 这类多重转义也能还原。
fn decode_entities_fully(text: &str) -> String {
    let mut decoded = text.to_string();
    loop {
        let next = html_escape::decode_html_entities(&decoded).into_owned();
        if next == decoded {
            return decoded;
        }
        decoded = next;
    }
}
