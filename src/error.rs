// src/error.rs

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// 运行级错误：出现时整个任务无法开始或无法继续。
#[derive(Error, Debug)]
pub enum AppError {
    #[error("无法创建保存目录 '{}': {source}", .path.display())]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("已有下载任务正在运行")]
    AlreadyRunning,
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("用户中断")]
    UserInterrupt,
    #[error("{0}")] // 只打印内部信息，不加任何前缀
    UserInputError(String),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// 单个链接的错误。只影响当前链接，记录为失败结果后任务继续。
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("获取下载链接失败: HTTP {}{}", .status.as_u16(), api_detail(.description))]
    ResolveStatus {
        status: StatusCode,
        description: Option<String>,
    },
    #[error("API 响应无效: {0}")]
    InvalidResponse(String),
    #[error("网络连接超时")]
    Timeout,
    #[error("无法建立连接: {0}")]
    Connection(#[source] reqwest::Error),
    #[error("网络请求失败: {0}")]
    Network(#[source] reqwest::Error),
    #[error("下载失败: HTTP {}", .0.as_u16())]
    DownloadStatus(StatusCode),
    #[error("本地文件读写错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("下载已取消")]
    Cancelled,
}

impl From<reqwest::Error> for LinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LinkError::Timeout
        } else if err.is_connect() {
            LinkError::Connection(err)
        } else {
            LinkError::Network(err)
        }
    }
}

fn api_detail(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}
