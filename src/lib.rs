// src/lib.rs

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod symbols;
pub mod ui;
pub mod utils;
pub mod versions;

use crate::{
    app::{AppState, Controller},
    cli::Cli,
    config::ConfigStore,
    downloader::OutputOrder,
    error::{AppError, AppResult},
    versions::SystemProbe,
};
use anyhow::anyhow;
use colored::*;
use log::{debug, info, warn};
use std::sync::Arc;

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    let store = ConfigStore::locate(args.config_dir.as_deref())?;
    logging::init(args.log_level, store.dir());
    debug!("CLI 参数: {:?}", args);

    let mut config = store.load();
    let mut dirty = false;
    if args.reset_dir {
        config.download_dir = config::AppConfig::default_download_dir();
        dirty = true;
    }
    if let Some(dir) = &args.download_dir {
        std::fs::create_dir_all(dir)?;
        config.download_dir = dunce::canonicalize(dir)?;
        dirty = true;
    }
    if let Some(theme) = args.theme {
        config.theme = theme;
        dirty = true;
    }
    if dirty {
        store.save(&config)?;
        info!("配置已保存到 {:?}", store.config_path());
    }
    config.theme.apply();

    let mapping = Arc::new(store.load_mapping());
    let bulk_delay = args
        .delay
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.bulk_delay());
    let order = if args.interleave_output {
        OutputOrder::Interleaved
    } else {
        OutputOrder::StdoutFirst
    };
    let ytdlp_config = match store.ensure_ytdlp_config() {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("无法创建 yt-dlp 配置文件 {:?}: {}", store.ytdlp_config_path(), e);
            None
        }
    };
    let state = AppState {
        store,
        config,
        mapping,
        tool: args.tool,
        bulk_delay,
        ytdlp_config,
    };
    let mut controller = Controller::new(state, order);

    if args.show_config {
        controller.print_config();
        return Ok(());
    }

    if args.check_versions {
        ui::print_header("外部工具版本检查");
        let probe = SystemProbe::default();
        for report in versions::check_all(&probe).await {
            let line = report.summary();
            match (report.up_to_date, &report.note) {
                (Some(false), _) => println!("{} {}", *symbols::WARN, line.yellow()),
                (_, Some(note)) => println!("{} {} ({})", *symbols::INFO, line, note.dimmed()),
                _ => println!("{} {}", *symbols::OK, line),
            }
        }
        return Ok(());
    }

    if let Some(url) = &args.url {
        let url = url.trim();
        return match controller.submit_url(url) {
            Ok(_) => {
                controller.run_until_idle().await;
                finish(&controller)
            }
            Err(e) => Err(e),
        };
    }

    if let Some(path) = &args.batch_file {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::UserInputError(format!("无法读取批量文件 {:?}: {}", path, e))
        })?;
        let urls = utils::parse_url_list(&content);
        if controller.submit_batch(urls).is_none() {
            return Ok(());
        }
        controller.run_until_idle().await;
        return finish(&controller);
    }

    if args.interactive {
        return controller.run_interactive().await;
    }

    Ok(())
}

fn finish(controller: &Controller) -> AppResult<()> {
    if controller.interrupted() {
        return Err(AppError::UserInterrupt);
    }
    match controller.unsuccessful() {
        0 => Ok(()),
        n => Err(AppError::Other(anyhow!("{} 个下载单元未能全部成功", n))),
    }
}
