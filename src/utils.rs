// src/utils.rs

use crate::{constants::layout, error::*};
use std::path::Path;
use url::Url;

/// 幂等地创建下载目录、各工具子目录与日志目录
pub async fn ensure_dirs(base: &Path) -> AppResult<()> {
    let subdirs = [
        layout::VIDEO,
        layout::AUDIO,
        layout::DOWNLOADED,
        layout::MUSIC,
        layout::OTHER_VIDEOS,
        layout::LOG_DIR,
    ];
    tokio::fs::create_dir_all(base).await?;
    for sub in subdirs {
        tokio::fs::create_dir_all(base.join(sub)).await?;
    }
    Ok(())
}

/// 解析批量文件：每行一个链接，忽略空行与 `#` 开头的注释
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// 交互模式下区分链接与命令
pub fn looks_like_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| url.has_host())
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}
