// src/resolver/mod.rs

use crate::{
    client::DiskClient,
    constants,
    error::LinkError,
    models::{
        ResolvedDownload, ShareLink,
        api::{ApiErrorBody, PublicDownloadLink},
    },
};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;
use url::Url;

/// 把分享链接解析为可直接下载的地址。
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, link: &ShareLink) -> Result<ResolvedDownload, LinkError>;
}

/// 通过 Yandex.Disk 公开 API 解析链接
pub struct YandexResolver {
    http_client: Arc<DiskClient>,
    endpoint: String,
}

impl YandexResolver {
    pub fn new(http_client: Arc<DiskClient>) -> Self {
        let endpoint = http_client.config().api_endpoint.clone();
        Self {
            http_client,
            endpoint,
        }
    }
}

#[async_trait]
impl LinkResolver for YandexResolver {
    async fn resolve(&self, link: &ShareLink) -> Result<ResolvedDownload, LinkError> {
        debug!("请求下载地址: {} (public_key={})", self.endpoint, link);
        let res = self
            .http_client
            .api_get(&self.endpoint)
            .query(&[(constants::api::PUBLIC_KEY_PARAM, link.as_str())])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let description = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|e| e.detail());
            warn!("链接 '{}' 解析失败: HTTP {} {:?}", link, status, description);
            return Err(LinkError::ResolveStatus {
                status,
                description,
            });
        }

        let body = res.text().await?;
        let payload: PublicDownloadLink = serde_json::from_str(&body)
            .map_err(|e| LinkError::InvalidResponse(format!("无法解析 JSON: {}", e)))?;
        let direct_url = payload
            .href
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| LinkError::InvalidResponse("缺少 'href' 字段".to_string()))?;

        let suggested_filename = infer_filename(&direct_url);
        info!(
            "链接 '{}' 已解析, 建议文件名: {:?}",
            link, suggested_filename
        );
        Ok(ResolvedDownload {
            direct_url,
            suggested_filename,
        })
    }
}

/// 从直链推断文件名。
///
/// 优先取查询参数 `filename`（已做百分号解码），否则取路径最后一段，
/// 但只有其中含有 '.' 时才认为是文件名。
pub fn infer_filename(direct_url: &str) -> Option<String> {
    let url = Url::parse(direct_url).ok()?;
    if let Some((_, name)) = url
        .query_pairs()
        .find(|(k, v)| k == constants::api::FILENAME_PARAM && !v.trim().is_empty())
    {
        return Some(name.into_owned());
    }

    let last_segment = url.path_segments()?.next_back()?;
    let decoded = percent_encoding::percent_decode_str(last_segment)
        .decode_utf8_lossy()
        .into_owned();
    (!decoded.is_empty() && decoded.contains('.')).then_some(decoded)
}
