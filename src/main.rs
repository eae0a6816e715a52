// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use std::{env, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use yadisk_dl::{cli::Cli, error::AppError, logging, run_from_cli};

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持。
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "yadisk-dl".to_string());
    let after_help = format!(
        "示例:\n  # 扫描网页文件中的链接并下载\n  {bin} page.html\n\n  # 只列出链接，不下载\n  {bin} -l notes.txt\n\n  # 直接提供链接，4 个并发\n  {bin} -w 4 -t \"https://disk.yandex.ru/d/xxxx\"\n\n  # 从标准输入读取\n  cat links.txt | {bin} -o ./downloads",
        bin = bin_name
    );
    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };
    logging::init_logger(args.log_level);

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        println!(
            "\n{} 正在取消，等待当前传输结束... (再按一次 Ctrl+C 强制退出)",
            "[!]".yellow()
        );
        log::warn!("收到 Ctrl+C，取消下载任务");
        signal_token.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{} 用户强制中断程序。", "[!]".yellow());
            tokio::time::sleep(Duration::from_millis(100)).await;
            std::process::exit(130);
        }
    });

    match run_from_cli(args, cancel).await {
        Ok(()) => {}
        Err(AppError::UserInterrupt) => {
            eprintln!("\n{} {}", "[!]".yellow(), "操作已被用户取消。".yellow());
            std::process::exit(1);
        }
        Err(AppError::UserInputError(msg)) => {
            eprintln!("\n{}", msg.red());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("\n{} {}", "[X]".red(), format!("程序执行出错: {}", e).red());
            std::process::exit(1);
        }
    }
}
