// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const LINK_TRUNCATE_LENGTH: usize = 70;
pub const MAX_FILENAME_BYTES: usize = 200;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_SAVE_DIR: &str = "Yandex_Downloads";
pub const USER_AGENT: &str = concat!(clap::crate_name!(), "/", clap::crate_version!());

/// 下载时每次读取与写入的块大小
pub const CHUNK_SIZE: usize = 8192;
/// 每下载这么多字节推送一次进度事件
pub const PROGRESS_EVENT_BYTES: u64 = 1024 * 1024;
pub const MAX_WORKERS: usize = 8;

pub const FALLBACK_FILE_PREFIX: &str = "file_";
pub const FALLBACK_FILE_EXTENSION: &str = "downloaded";
pub const UNNAMED_FILE: &str = "unnamed";

pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["html", "htm", "txt"];

pub mod api {
    pub const PUBLIC_DOWNLOAD_ENDPOINT: &str =
        "https://cloud-api.yandex.net/v1/disk/public/resources/download";
    pub const PUBLIC_KEY_PARAM: &str = "public_key";
    pub const FILENAME_PARAM: &str = "filename";
}

pub mod network {
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const RESOLVE_TIMEOUT_SECS: u64 = 30;
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 60;
    pub const ITEM_DELAY_MS: u64 = 500;
}

/// 判定链接属于 Yandex.Disk 的域名标记（小写比较）
pub const ALLOWED_DOMAIN_MARKERS: &[&str] = &["yandex.ru", "yandex.com", "yadi.sk", "disk.yandex"];
