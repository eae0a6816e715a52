// src/ui.rs

use crate::{
    constants,
    models::{LogRecord, Progress, RunSummary, ShareLink},
    symbols, utils,
};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

/// 打印识别到的链接列表
pub fn print_link_list(links: &[ShareLink]) {
    let pad = links.len().to_string().len();
    for (i, link) in links.iter().enumerate() {
        println!(
            "  [{}] {}",
            format!("{:>pad$}", i + 1, pad = pad).yellow(),
            utils::truncate_text(link.as_str(), constants::LINK_TRUNCATE_LENGTH)
        );
    }
}

pub fn new_tasks_progress_bar(total: usize) -> ProgressBar {
    let pbar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{prefix:7.bold.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}/{len:3} ({percent:>3}%) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pbar.set_style(style);
    pbar.set_prefix("总进度");
    pbar
}

pub fn progress_message(progress: &Progress) -> String {
    format!(
        "{} {}",
        format!("成功 {}", progress.successes).green(),
        format!("失败 {}", progress.failures).red()
    )
}

/// 单条结果的展示行：`[时间] 标记 链接 - 说明`
pub fn format_record(record: &LogRecord) -> String {
    let (symbol, color_fn, label) = record.status.get_display_info();
    let link = utils::truncate_text(record.link.as_str(), constants::LINK_TRUNCATE_LENGTH);
    let detail = match &record.detail {
        Some(detail) if record.status.is_success() => format!("{} -> {}", label, detail),
        Some(detail) => detail.clone(),
        None => label.to_string(),
    };
    format!(
        "[{}] {} {} - {}",
        record.timestamp.format("%H:%M:%S"),
        symbol,
        link,
        color_fn(detail.into())
    )
}

/// 任务结束后的汇总报告，失败项按原因分组
pub fn print_run_report(summary: &RunSummary) {
    let failed: Vec<(String, String)> = summary
        .outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| {
            let (_, _, label) = o.status.get_display_info();
            let reason = o
                .error_detail
                .clone()
                .unwrap_or_else(|| label.to_string());
            (o.link.to_string(), reason)
        })
        .collect();

    if !failed.is_empty() {
        print_sub_header("下载详情报告");
        println!("\n{} 失败的链接 ({}个):", *symbols::ERROR, failed.len());
        print_grouped_report(&failed, |s| s.red());
    }

    print_sub_header("任务总结");
    if summary.all_succeeded() {
        println!(
            "{} 所有 {} 个链接均已下载成功。",
            *symbols::OK,
            summary.total
        );
    } else {
        println!(
            "{} | {} | 已处理 {}/{}",
            format!("成功: {}", summary.successes).green(),
            format!("失败: {}", summary.failures).red(),
            summary.attempted,
            summary.total
        );
    }
    if summary.cancelled {
        println!(
            "{} 任务已被用户取消，剩余 {} 个链接未处理。",
            *symbols::STOP,
            summary.total - summary.attempted
        );
    }
}

fn print_grouped_report(items: &[(String, String)], color_fn: fn(ColoredString) -> ColoredString) {
    let mut grouped: HashMap<&String, Vec<&String>> = HashMap::new();
    for (link, reason) in items {
        grouped.entry(reason).or_default().push(link);
    }
    let mut sorted_reasons: Vec<_> = grouped.keys().copied().collect();
    sorted_reasons.sort();
    for reason in sorted_reasons {
        println!("  - {}", color_fn(format!("原因: {}", reason).into()));
        let mut links = grouped.get(reason).cloned().unwrap_or_default();
        links.sort();
        for link in links {
            println!(
                "    - {}",
                utils::truncate_text(link, constants::LINK_TRUNCATE_LENGTH)
            );
        }
    }
}
