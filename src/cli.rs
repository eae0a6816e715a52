// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, command, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true,
)]
pub struct Cli {
    // --- 输入 (Input) ---
    /// 要扫描的 HTML 或文本文件 (.html, .htm, .txt)
    #[arg(value_name = "FILE", help_heading = "Input")]
    pub inputs: Vec<PathBuf>,
    /// 直接提供包含链接的文本，可重复使用
    #[arg(short, long, value_name = "TEXT", help_heading = "Input")]
    pub text: Vec<String>,

    // --- 下载选项 (Options) ---
    /// 设置文件保存目录
    #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_SAVE_DIR), help_heading = "Options")]
    pub output: PathBuf,
    /// 只列出识别到的链接，不下载
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub list: bool,
    /// 设置最大并发下载数 (1 为逐个下载)
    #[arg(short, long, value_parser = clap::value_parser!(usize), help_heading = "Options")]
    pub workers: Option<usize>,
    /// 两个链接之间的停顿 (毫秒)
    #[arg(long, value_name = "MS", help_heading = "Options")]
    pub delay: Option<u64>,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

impl Cli {
    /// 既没有文件也没有 --text 时，从标准输入读取
    pub fn reads_stdin(&self) -> bool {
        self.inputs.is_empty() && self.text.is_empty()
    }
}
