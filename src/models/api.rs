// src/models/api.rs

use serde::Deserialize;

/// `GET /v1/disk/public/resources/download` 的成功响应
#[derive(Deserialize, Debug, Clone)]
pub struct PublicDownloadLink {
    pub href: Option<String>,
}

/// API 返回非 2xx 状态时携带的错误对象
#[derive(Deserialize, Debug, Clone)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ApiErrorBody {
    /// 优先使用本地化的 `message`，其次是 `description`，最后是错误码。
    pub fn detail(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.description.clone())
            .or_else(|| self.error.clone())
            .filter(|s| !s.trim().is_empty())
    }
}
