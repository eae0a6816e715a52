// src/config.rs

pub mod store;

use self::store::load_or_create_external_config;
use crate::{cli::Cli, constants, error::AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub resolve_timeout_secs: Option<u64>,
    pub download_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    pub public_download_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        Self {
            network: NetworkConfig {
                connect_timeout_secs: Some(constants::network::CONNECT_TIMEOUT_SECS),
                resolve_timeout_secs: Some(constants::network::RESOLVE_TIMEOUT_SECS),
                download_timeout_secs: Some(constants::network::DOWNLOAD_TIMEOUT_SECS),
            },
            api: ApiConfig {
                public_download_endpoint: Some(constants::api::PUBLIC_DOWNLOAD_ENDPOINT.into()),
            },
            item_delay_ms: Some(constants::network::ITEM_DELAY_MS),
            workers: Some(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 并发下载数，1 表示逐个顺序处理
    pub max_workers: usize,
    pub user_agent: String,
    pub api_endpoint: String,
    pub connect_timeout: Duration,
    pub resolve_timeout: Duration,
    pub download_timeout: Duration,
    /// 两个链接之间的停顿
    pub item_delay: Duration,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let external_config = load_or_create_external_config()?;
        Ok(Self::from_parts(args, external_config))
    }

    fn from_parts(args: &Cli, external_config: ExternalConfig) -> Self {
        let network = external_config.network;
        let workers = args.workers.or(external_config.workers).unwrap_or(1);
        let delay_ms = args
            .delay
            .or(external_config.item_delay_ms)
            .unwrap_or(constants::network::ITEM_DELAY_MS);

        Self {
            max_workers: workers.clamp(1, constants::MAX_WORKERS),
            user_agent: constants::USER_AGENT.into(),
            api_endpoint: external_config
                .api
                .public_download_endpoint
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| constants::api::PUBLIC_DOWNLOAD_ENDPOINT.into()),
            connect_timeout: Duration::from_secs(
                network
                    .connect_timeout_secs
                    .unwrap_or(constants::network::CONNECT_TIMEOUT_SECS),
            ),
            resolve_timeout: Duration::from_secs(
                network
                    .resolve_timeout_secs
                    .unwrap_or(constants::network::RESOLVE_TIMEOUT_SECS),
            ),
            download_timeout: Duration::from_secs(
                network
                    .download_timeout_secs
                    .unwrap_or(constants::network::DOWNLOAD_TIMEOUT_SECS),
            ),
            item_delay: Duration::from_millis(delay_ms),
        }
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_workers: 1,
            user_agent: "test-agent/1.0".to_string(),
            api_endpoint: constants::api::PUBLIC_DOWNLOAD_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(5),
            resolve_timeout: Duration::from_secs(constants::network::RESOLVE_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(constants::network::DOWNLOAD_TIMEOUT_SECS),
            item_delay: Duration::ZERO,
        }
    }
}
