// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use feliciadl::{cli::Cli, run_from_cli};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| clap::crate_name!().to_string());

    let after_help = format!(
        "示例:\n  # 启动交互模式 (推荐)\n  {bin} -i\n\n  # 下载单个视频\n  {bin} --url \"https://...\"\n\n  # 按域名自动选择工具\n  {bin} --url \"https://...\" -t auto\n\n  # 批量下载，每个任务间隔 10 秒\n  {bin} -b my_links.txt -t yt-audio --delay 10",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };

    if let Err(e) = run_from_cli(args).await {
        eprintln!("\n{} {}", "[X]".red(), format!("程序执行出错: {}", e).red());
        std::process::exit(1);
    }
}
