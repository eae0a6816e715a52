// src/models/mod.rs

pub mod api;

use crate::{constants, error::LinkError, symbols};
use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

/// 经过校验的 Yandex.Disk 公开分享链接。
///
/// 只能由 [`ShareLink::parse`] 构造，保证非空、是带主机名的 http(s) 地址、
/// 并且包含允许的域名标记。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareLink(String);

impl ShareLink {
    pub fn parse(candidate: &str) -> Option<Self> {
        if candidate.is_empty() {
            return None;
        }
        let url = url::Url::parse(candidate).ok()?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return None;
        }
        is_allowed_domain(candidate).then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 域名白名单检查：统一转为小写后再比较，与匹配阶段的大小写策略保持一致。
pub fn is_allowed_domain(url: &str) -> bool {
    let lower = url.to_lowercase();
    constants::ALLOWED_DOMAIN_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShareLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShareLink {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("不是有效的 Yandex.Disk 链接: {}", value))
    }
}

impl From<ShareLink> for String {
    fn from(link: ShareLink) -> Self {
        link.0
    }
}

/// 解析成功后得到的直链以及推断出的文件名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDownload {
    pub direct_url: String,
    pub suggested_filename: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OutcomeStatus {
    Success,
    ResolveFailed,
    InvalidResponse,
    HttpError,
    TimeoutError,
    ConnectionError,
    NetworkError,
    IoError,
    Cancelled,
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }

    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            OutcomeStatus::Success => (&symbols::OK, |s| s.green(), "下载成功"),
            OutcomeStatus::ResolveFailed => (&symbols::ERROR, |s| s.red(), "获取下载链接失败"),
            OutcomeStatus::InvalidResponse => (&symbols::ERROR, |s| s.red(), "API 响应无效"),
            OutcomeStatus::HttpError => (&symbols::ERROR, |s| s.red(), "服务器返回错误"),
            OutcomeStatus::TimeoutError => (&symbols::WARN, |s| s.yellow(), "网络连接超时"),
            OutcomeStatus::ConnectionError => (&symbols::ERROR, |s| s.red(), "无法建立连接"),
            OutcomeStatus::NetworkError => (&symbols::ERROR, |s| s.red(), "网络请求失败"),
            OutcomeStatus::IoError => (&symbols::ERROR, |s| s.red(), "本地文件读写错误"),
            OutcomeStatus::Cancelled => (&symbols::STOP, |s| s.yellow(), "已取消"),
        }
    }
}

impl From<&LinkError> for OutcomeStatus {
    fn from(error: &LinkError) -> Self {
        match error {
            LinkError::ResolveStatus { .. } => OutcomeStatus::ResolveFailed,
            LinkError::InvalidResponse(_) => OutcomeStatus::InvalidResponse,
            LinkError::Timeout => OutcomeStatus::TimeoutError,
            LinkError::Connection(_) => OutcomeStatus::ConnectionError,
            LinkError::Network(_) => OutcomeStatus::NetworkError,
            LinkError::DownloadStatus(_) => OutcomeStatus::HttpError,
            LinkError::Io(_) => OutcomeStatus::IoError,
            LinkError::Cancelled => OutcomeStatus::Cancelled,
        }
    }
}

/// 单个链接的处理结果，每个被尝试的链接恰好对应一个。
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub link: ShareLink,
    pub status: OutcomeStatus,
    pub bytes_written: u64,
    /// 实际写入的路径（已处理重名）
    pub path: Option<PathBuf>,
    pub error_detail: Option<String>,
}

impl DownloadOutcome {
    pub fn success(link: ShareLink, path: PathBuf, bytes_written: u64) -> Self {
        Self {
            link,
            status: OutcomeStatus::Success,
            bytes_written,
            path: Some(path),
            error_detail: None,
        }
    }

    pub fn failure(link: ShareLink, path: Option<PathBuf>, error: &LinkError) -> Self {
        Self {
            link,
            status: OutcomeStatus::from(error),
            bytes_written: 0,
            path,
            error_detail: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub successes: usize,
    pub failures: usize,
}

/// 面向展示层的单条日志记录
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub link: ShareLink,
    pub status: OutcomeStatus,
    pub detail: Option<String>,
}

impl From<&DownloadOutcome> for LogRecord {
    fn from(outcome: &DownloadOutcome) -> Self {
        let detail = match (&outcome.error_detail, &outcome.path) {
            (Some(err), _) => Some(err.clone()),
            (None, Some(path)) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            (None, None) => None,
        };
        Self {
            timestamp: Local::now(),
            link: outcome.link.clone(),
            status: outcome.status,
            detail,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub attempted: usize,
    pub successes: usize,
    pub failures: usize,
    pub cancelled: bool,
    pub outcomes: Vec<DownloadOutcome>,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        !self.cancelled && self.failures == 0 && self.successes == self.total
    }
}

/// 下载任务向调用方推送的事件
#[derive(Debug, Clone)]
pub enum RunEvent {
    Started {
        total: usize,
        destination: PathBuf,
    },
    ItemStarted {
        index: usize,
        total: usize,
        link: ShareLink,
    },
    /// 当前项已写入的字节数，按固定步长推送
    ItemProgress {
        index: usize,
        bytes: u64,
    },
    ItemFinished {
        record: LogRecord,
        progress: Progress,
    },
    Finished(RunSummary),
}
