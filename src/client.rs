// src/client.rs

use crate::{config::AppConfig, error::*};
use log::debug;
use reqwest::{IntoUrl, RequestBuilder};
use std::sync::Arc;

/// 所有请求共用的 HTTP 客户端。
///
/// 不设置全局超时：解析请求和下载请求分别使用各自的超时策略。
#[derive(Clone)]
pub struct DiskClient {
    pub client: reqwest::Client,
    config: Arc<AppConfig>,
}

impl DiskClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.max_workers * 2)
            .build()?;
        debug!(
            "HTTP 客户端已创建 (UA: {}, 连接超时: {:?})",
            config.user_agent, config.connect_timeout
        );
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 构造一个带解析超时的 GET 请求
    pub fn api_get<T: IntoUrl>(&self, url: T) -> RequestBuilder {
        self.client.get(url).timeout(self.config.resolve_timeout)
    }

    /// 构造一个流式下载请求，超时由调用方逐块控制
    pub fn stream_get<T: IntoUrl>(&self, url: T) -> RequestBuilder {
        self.client.get(url)
    }
}
