// src/logging.rs

use crate::{cli::LogLevel, constants};
use std::{env, path::Path};

/// 诊断日志写入配置目录下的文件，与下载记录分开。默认关闭。
pub fn init(level: LogLevel, config_dir: &Path) {
    if level == LogLevel::Off {
        return;
    }

    let filter = match level {
        LogLevel::Off => log::LevelFilter::Off,
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warn => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
        LogLevel::Trace => log::LevelFilter::Trace,
    };

    let app_name = clap::crate_name!();
    let log_file_path = config_dir.join(constants::LOG_FILE_NAME);

    if let Some(dir) = log_file_path.parent()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("警告: 无法创建日志目录 {:?}: {}", dir, e);
    }

    let file_appender = match fern::log_file(&log_file_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "警告: 无法打开主日志文件 {:?} : {}。将尝试使用备用日志文件。",
                log_file_path, e
            );
            let fallback_path = env::temp_dir().join(format!(
                "{}-{}",
                app_name,
                constants::LOG_FALLBACK_FILE_NAME
            ));
            match fern::log_file(&fallback_path) {
                Ok(fb_file) => {
                    eprintln!("警告: 日志将写入备用文件: {:?}", fallback_path);
                    fb_file
                }
                Err(e_fb) => {
                    eprintln!(
                        "错误: 无法创建主日志和备用日志文件 {:?}: {}。日志将不会被记录到文件。",
                        fallback_path, e_fb
                    );
                    return;
                }
            }
        }
    };

    let result = fern::Dispatch::new()
        .level(filter)
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] [{:<5}] [{}:{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.line().unwrap_or(0),
                message
            ))
        })
        .chain(file_appender)
        .apply();

    if let Err(e) = result {
        eprintln!("警告: 日志系统初始化失败: {}", e);
    }
}
