// src/utils.rs

use crate::constants;
use regex::Regex;
use std::{ffi::OsStr, path::Path, sync::LazyLock};

static ILLEGAL_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|\x00-\x1f\x7f]"#).unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const WINDOWS_RESERVED: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

pub fn sanitize_filename(name: &str) -> String {
    let original_name = name.trim();
    if original_name.is_empty() {
        return constants::UNNAMED_FILE.to_string();
    }

    let mut name = ILLEGAL_CHARS_RE.replace_all(original_name, " ").into_owned();
    name = WHITESPACE_RE.replace_all(&name, " ").trim().to_string();
    name = name.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_string();
    if name.is_empty() {
        return constants::UNNAMED_FILE.to_string();
    }

    let stem = Path::new(&name)
        .file_stem()
        .unwrap_or_else(|| OsStr::new(&name))
        .to_string_lossy()
        .to_uppercase();
    if WINDOWS_RESERVED.contains(&stem.as_ref()) {
        name = format!("_{}", name);
    }

    if name.len() > constants::MAX_FILENAME_BYTES {
        let (stem_part, ext) = split_extension(&name);
        name = match ext {
            Some(ext) => {
                let ext_str = format!(".{}", ext);
                let max_stem_bytes = constants::MAX_FILENAME_BYTES.saturating_sub(ext_str.len());
                format!("{}{}", safe_truncate_utf8(stem_part, max_stem_bytes), ext_str)
            }
            None => safe_truncate_utf8(&name, constants::MAX_FILENAME_BYTES).to_string(),
        };
    }
    name
}

/// 按最后一个 '.' 拆分主名与扩展名，".bashrc" 这类以点开头的名字视为没有扩展名。
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => (&name[..pos], Some(&name[pos + 1..])),
        _ => (name, None),
    }
}

fn safe_truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut i = max_bytes;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    &s[..i]
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}
