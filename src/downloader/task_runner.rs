// src/downloader/task_runner.rs

use super::{RunContext, transfer};
use crate::constants;
use crate::models::{DownloadOutcome, LogRecord, RunEvent, RunSummary, ShareLink};
use futures::{StreamExt, stream};
use log::{error, info, warn};
use std::cmp::min;

/// 依次（或以有限并发）处理所有链接：解析 → 命名 → 下载。
///
/// 每个链接开始前检查取消标记；一旦取消，剩余链接不会再发出任何请求。
/// 所有正在进行的传输都到达块边界并清理完毕后才返回。
pub(super) async fn execute_links(context: RunContext, links: Vec<ShareLink>) -> RunSummary {
    let total = links.len();
    let max_workers = min(context.max_workers, total.max(1));
    info!(
        "开始处理 {} 个链接 (并发数: {}), 保存到 {:?}",
        total, max_workers, context.destination
    );
    let _ = context.events.send(RunEvent::Started {
        total,
        destination: context.destination.as_ref().clone(),
    });

    stream::iter(links.into_iter().enumerate())
        .for_each_concurrent(max_workers, |(index, link)| {
            run_single_link(context.clone(), index, total, link)
        })
        .await;

    let summary = context.stats.summarize(context.cancel.is_cancelled());
    if summary.cancelled {
        warn!(
            "任务已取消: 完成 {}/{} (成功 {}, 失败 {})",
            summary.attempted, summary.total, summary.successes, summary.failures
        );
    } else {
        info!(
            "任务完成: 成功 {}, 失败 {}, 总计 {}",
            summary.successes, summary.failures, summary.total
        );
    }
    let _ = context.events.send(RunEvent::Finished(summary.clone()));
    summary
}

/// 在并发池中运行的单个任务单元。
async fn run_single_link(context: RunContext, index: usize, total: usize, link: ShareLink) {
    if context.cancel.is_cancelled() {
        return;
    }
    let _ = context.events.send(RunEvent::ItemStarted {
        index,
        total,
        link: link.clone(),
    });
    info!("[{}/{}] 处理: {}", index + 1, total, link);

    let outcome = process_link(&context, index, link).await;
    if let Some(detail) = &outcome.error_detail {
        error!("链接 '{}' 处理失败: {}", outcome.link, detail);
    } else {
        info!(
            "链接 '{}' 下载成功: {:?} ({} 字节)",
            outcome.link, outcome.path, outcome.bytes_written
        );
    }

    let record = LogRecord::from(&outcome);
    let progress = context.stats.record(outcome);
    let _ = context
        .events
        .send(RunEvent::ItemFinished { record, progress });

    if index + 1 < total && !context.item_delay.is_zero() {
        tokio::select! {
            _ = context.cancel.cancelled() => {}
            _ = tokio::time::sleep(context.item_delay) => {}
        }
    }
}

async fn process_link(context: &RunContext, index: usize, link: ShareLink) -> DownloadOutcome {
    let resolved = match context.resolver.resolve(&link).await {
        Ok(resolved) => resolved,
        Err(e) => return DownloadOutcome::failure(link, None, &e),
    };

    let path = context
        .namer
        .name_file(resolved.suggested_filename.as_deref(), &context.destination);
    info!("下载: {:?} <- {}", path.file_name(), resolved.direct_url);

    let mut next_mark = constants::PROGRESS_EVENT_BYTES;
    let report_progress = |bytes: u64| {
        if bytes >= next_mark {
            next_mark = bytes + constants::PROGRESS_EVENT_BYTES;
            let _ = context.events.send(RunEvent::ItemProgress { index, bytes });
        }
    };

    match transfer::download(
        &context.http_client,
        &resolved.direct_url,
        &path,
        &context.cancel,
        report_progress,
    )
    .await
    {
        Ok(bytes) => DownloadOutcome::success(link, path, bytes),
        Err(e) => DownloadOutcome::failure(link, Some(path), &e),
    }
}
