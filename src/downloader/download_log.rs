// src/downloader/download_log.rs

use crate::{constants::layout, error::AppResult};
use log::debug;
use std::path::{Path, PathBuf};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

/// 下载记录 `<下载目录>/log/download.log`，只追加。
///
/// 每次写入都重新打开文件并一次性写出整行，不长期持有句柄，
/// 因此并发任务的记录可能交错，但不会出现半行。
#[derive(Debug, Clone)]
pub struct DownloadLog {
    path: PathBuf,
}

impl DownloadLog {
    pub fn for_download_dir(base: &Path) -> Self {
        Self {
            path: base.join(layout::LOG_DIR).join(layout::DOWNLOAD_LOG),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &str) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let line = format!("{}\n", entry);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!("已写入下载记录: {}", entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_appends_stay_well_formed() {
        let dir = tempfile::tempdir().unwrap();
        let log = DownloadLog::for_download_dir(dir.path());
        let first = "Youtube-DL-Video (Youtube-DL-Video): https://a.example/1";
        let second = "Automatic (Gallery-DL): https://b.example/2";

        let mut handles = Vec::new();
        for i in 0..40 {
            let log = log.clone();
            let entry = if i % 2 == 0 { first } else { second };
            handles.push(tokio::spawn(async move { log.append(entry).await.unwrap() }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 40);
        assert!(lines.iter().all(|l| *l == first || *l == second));
        assert_eq!(lines.iter().filter(|l| **l == first).count(), 20);
    }
}
