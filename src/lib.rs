// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod input;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod symbols;
pub mod ui;
pub mod utils;

use crate::{
    cli::Cli,
    client::DiskClient,
    config::AppConfig,
    downloader::{Pipeline, RunHandle},
    error::{AppError, AppResult},
    models::{RunEvent, RunSummary, ShareLink},
};
use anyhow::anyhow;
use colored::*;
use indicatif::HumanBytes;
use itertools::Itertools;
use log::{debug, info};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>, cancel: CancellationToken) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);

    let texts = input::gather_text(&args)?;
    let links: Vec<ShareLink> = texts
        .iter()
        .flat_map(|text| extractor::extract_links(text))
        .unique()
        .collect();
    info!("共识别到 {} 个链接", links.len());

    if links.is_empty() {
        return Err(AppError::UserInputError(format!(
            "{} 未在输入中找到任何 Yandex.Disk 链接。",
            *symbols::WARN
        )));
    }

    ui::print_header(&format!("识别到 {} 个链接", links.len()));
    ui::print_link_list(&links);
    if args.list {
        return Ok(());
    }

    let config = Arc::new(AppConfig::new(&args)?);
    debug!("加载的应用配置: {:?}", config);
    let http_client = Arc::new(DiskClient::new(config.clone())?);
    let pipeline = Pipeline::new(http_client);

    let handle = pipeline.start_run(links, &args.output, cancel)?;
    let summary = follow_run(handle).await?;

    ui::print_run_report(&summary);
    if summary.cancelled {
        Err(AppError::UserInterrupt)
    } else if summary.failures > 0 {
        Err(AppError::Other(anyhow!(
            "{} 个链接下载失败。",
            summary.failures
        )))
    } else {
        Ok(())
    }
}

/// 消费运行事件并渲染进度条，直到运行结束
async fn follow_run(mut handle: RunHandle) -> AppResult<RunSummary> {
    let Some(mut events) = handle.take_events() else {
        return handle.wait().await;
    };

    let pbar = ui::new_tasks_progress_bar(0);
    while let Some(event) = events.recv().await {
        match event {
            RunEvent::Started { total, destination } => {
                pbar.println(format!(
                    "\n{} 文件将保存到: \"{}\" (按 {} 可取消)",
                    *symbols::INFO,
                    destination.display(),
                    *symbols::CTRL_C
                ));
                pbar.set_length(total as u64);
            }
            RunEvent::ItemStarted { index, total, link } => {
                debug!("[{}/{}] 开始: {}", index + 1, total, link);
                pbar.set_message(utils::truncate_text(link.as_str(), 40).dimmed().to_string());
            }
            RunEvent::ItemProgress { index, bytes } => {
                pbar.set_message(format!("#{} 已下载 {}", index + 1, HumanBytes(bytes)));
            }
            RunEvent::ItemFinished { record, progress } => {
                pbar.println(ui::format_record(&record));
                pbar.set_position(progress.completed as u64);
                pbar.set_message(ui::progress_message(&progress));
            }
            RunEvent::Finished(_) => break,
        }
    }
    pbar.finish_and_clear();
    handle.wait().await
}
