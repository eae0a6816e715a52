// src/input.rs

use crate::{
    cli::Cli,
    constants,
    error::{AppError, AppResult},
};
use anyhow::Context;
use log::{debug, info};
use std::{
    fs,
    io::{self, Read},
    path::Path,
};

/// 收集所有待扫描的文本：文件内容、`--text` 参数，或者标准输入。
pub fn gather_text(args: &Cli) -> AppResult<Vec<String>> {
    let mut texts = Vec::with_capacity(args.inputs.len() + args.text.len());
    for path in &args.inputs {
        texts.push(read_input_file(path)?);
    }
    texts.extend(args.text.iter().cloned());

    if args.reads_stdin() {
        info!("未提供文件或文本，从标准输入读取");
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("读取标准输入失败")?;
        texts.push(buf);
    }
    Ok(texts)
}

/// 读取 .html/.htm/.txt 文件，其他扩展名视为用户输入错误。
pub fn read_input_file(path: &Path) -> AppResult<String> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !constants::SUPPORTED_INPUT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::UserInputError(format!(
            "不支持的文件类型 '{}'，只接受 {} 文件",
            path.display(),
            constants::SUPPORTED_INPUT_EXTENSIONS
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join("/")
        )));
    }
    let bytes = fs::read(path).with_context(|| format!("读取文件 '{}' 失败", path.display()))?;
    debug!("已读取 {:?} ({} 字节)", path, bytes.len());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_reads_supported_extensions_case_insensitively() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("links.HTML");
        fs::write(&path, "<a href=\"https://yadi.sk/d/abc\">x</a>").unwrap();
        let text = read_input_file(&path).unwrap();
        assert!(text.contains("yadi.sk/d/abc"));
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("links.pdf");
        fs::write(&path, "https://yadi.sk/d/abc").unwrap();
        let err = read_input_file(&path).unwrap_err();
        assert!(matches!(err, AppError::UserInputError(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = read_input_file(&tmp.path().join("absent.txt")).unwrap_err();
        assert!(err.to_string().contains("absent.txt"));
    }
}
