// src/cli.rs

use crate::{config::Theme, models::ToolKind};
use clap::{Parser, ValueEnum, crate_version};
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

/// 调用 yt-dlp / gallery-dl / spotdl 下载媒体，支持批量模式与按域名自动选择工具
#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("mode")
        .required(true)
        .args(&["interactive", "url", "batch_file", "check_versions", "show_config"]),
))]
pub struct Cli {
    // --- 运行模式 (Mode) ---
    /// 启动交互式会话，可同时运行多个任务
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub interactive: bool,
    /// 下载单个链接
    #[arg(long, help_heading = "Mode")]
    pub url: Option<String>,
    /// 批量模式: 从文本文件逐行读取链接，按顺序依次下载
    #[arg(short, long, value_name = "FILE", help_heading = "Mode")]
    pub batch_file: Option<PathBuf>,
    /// 检查外部工具的已安装版本与最新版本
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub check_versions: bool,
    /// 显示当前配置与自动模式映射
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub show_config: bool,

    // --- 下载选项 (Options) ---
    /// 使用的下载工具，auto 表示按域名自动选择
    #[arg(short, long, value_enum, default_value_t = ToolKind::VideoDownload, help_heading = "Options")]
    pub tool: ToolKind,
    /// 设置并保存下载目录
    #[arg(short = 'o', long, value_name = "DIR", conflicts_with = "reset_dir", help_heading = "Options")]
    pub download_dir: Option<PathBuf>,
    /// 恢复并保存默认下载目录
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub reset_dir: bool,
    /// 设置并保存终端配色主题
    #[arg(long, value_enum, help_heading = "Options")]
    pub theme: Option<Theme>,
    /// [批量模式] 两个任务之间的等待秒数
    #[arg(long, value_name = "SECS", help_heading = "Options")]
    pub delay: Option<u64>,
    /// 外部程序的 stdout 与 stderr 按读取顺序交替输出 (默认先输出全部 stdout)
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub interleave_output: bool,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (隐藏参数) 配置目录
    #[arg(long, value_name = "DIR", env = "FELICIADL_CONFIG_DIR", hide = true)]
    pub config_dir: Option<PathBuf>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tool_accepts_display_name_alias() {
        let cli = Cli::try_parse_from(["feliciadl", "--url", "https://x.com/a", "-t", "Gallery-DL"]).unwrap();
        assert_eq!(cli.tool, ToolKind::GalleryDownload);
    }

    #[test]
    fn test_mode_is_required() {
        assert!(Cli::try_parse_from(["feliciadl", "--tool", "auto"]).is_err());
        assert!(Cli::try_parse_from(["feliciadl", "--url", "a", "-i"]).is_err());
    }
}
