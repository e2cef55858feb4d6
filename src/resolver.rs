// src/resolver.rs

use crate::{
    config::AutomaticMapping,
    error::{AppError, AppResult},
    models::{CommandSpec, Job, ToolKind},
};
use log::{debug, info};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// 把 "链接 + 工具选择" 变成可执行的任务。
///
/// 批量模式通过这个接口逐条生成任务，测试中可以替换为假的实现。
pub trait JobPlanner: Send + Sync {
    fn plan(&self, tool: ToolKind, url: &str) -> AppResult<Job>;
}

/// 解析结果：具体命令与最终使用的后端
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub command: CommandSpec,
    pub resolved: ToolKind,
}

/// 取出 "//" 之后、下一个 "/" 之前的部分并转为小写。
pub fn extract_domain(url: &str) -> AppResult<String> {
    let invalid = || AppError::InvalidUrl(url.to_string());
    let (_, rest) = url.split_once("//").ok_or_else(invalid)?;
    let domain = rest.split('/').next().unwrap_or_default().trim();
    if domain.is_empty() {
        return Err(invalid());
    }
    Ok(domain.to_lowercase())
}

#[derive(Debug, Clone)]
pub struct Resolver {
    mapping: Arc<AutomaticMapping>,
    download_dir: PathBuf,
    ytdlp_config: Option<PathBuf>,
}

impl Resolver {
    pub fn new(mapping: Arc<AutomaticMapping>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            mapping,
            download_dir: download_dir.into(),
            ytdlp_config: None,
        }
    }

    /// yt-dlp 命令附带的配置文件
    pub fn with_ytdlp_config(mut self, path: Option<PathBuf>) -> Self {
        self.ytdlp_config = path;
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// 纯函数：不创建目录，不启动进程。
    pub fn resolve(&self, tool: ToolKind, url: &str) -> AppResult<Resolution> {
        let resolved = match tool {
            ToolKind::Automatic => {
                let domain = extract_domain(url)?;
                debug!("自动模式: 链接 '{}' 的域名为 '{}'", url, domain);
                let backend = self
                    .mapping
                    .find(&domain)
                    .ok_or(AppError::UnresolvedAutomatic { domain })?;
                info!("自动模式将链接 '{}' 分配给 {}", url, backend);
                backend
            }
            concrete => concrete,
        };
        let command = resolved
            .command(url, &self.download_dir, self.ytdlp_config.as_deref())
            .ok_or_else(|| AppError::UserInputError(format!("工具 {} 没有可用的命令模板", resolved)))?;
        Ok(Resolution { command, resolved })
    }
}

impl JobPlanner for Resolver {
    fn plan(&self, tool: ToolKind, url: &str) -> AppResult<Job> {
        let Resolution { command, resolved } = self.resolve(tool, url)?;
        Ok(Job::new(url, tool, resolved, command, self.download_dir.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(entries: Vec<(ToolKind, Vec<&str>)>) -> Resolver {
        let mapping = AutomaticMapping::new(
            entries
                .into_iter()
                .map(|(t, subs)| (t, subs.into_iter().map(String::from).collect()))
                .collect(),
        );
        Resolver::new(Arc::new(mapping), "/base")
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://WWW.YouTube.com/watch?v=1").unwrap(), "www.youtube.com");
        assert_eq!(extract_domain("http://example.com").unwrap(), "example.com");
        assert!(matches!(extract_domain("not-a-url"), Err(AppError::InvalidUrl(_))));
        assert!(matches!(extract_domain("https:///path"), Err(AppError::InvalidUrl(_))));
    }

    #[test]
    fn test_concrete_tools_are_deterministic() {
        let r = resolver(vec![]);
        for tool in ToolKind::CONCRETE {
            let first = r.resolve(tool, "https://example.com/v").unwrap();
            let second = r.resolve(tool, "https://example.com/v").unwrap();
            assert_eq!(first, second);
            assert_eq!(first.resolved, tool);
        }
    }

    #[test]
    fn test_automatic_first_match_wins() {
        let url = "https://music.youtube.com/watch?v=abc";
        let video_first = resolver(vec![
            (ToolKind::VideoDownload, vec!["youtube"]),
            (ToolKind::AudioExtract, vec!["music.youtube"]),
        ]);
        assert_eq!(
            video_first.resolve(ToolKind::Automatic, url).unwrap().resolved,
            ToolKind::VideoDownload
        );

        let audio_first = resolver(vec![
            (ToolKind::AudioExtract, vec!["music.youtube"]),
            (ToolKind::VideoDownload, vec!["youtube"]),
        ]);
        assert_eq!(
            audio_first.resolve(ToolKind::Automatic, url).unwrap().resolved,
            ToolKind::AudioExtract
        );
    }

    #[test]
    fn test_automatic_matches_any_substring_of_entry() {
        let r = resolver(vec![
            (ToolKind::MusicDownload, vec!["spotify"]),
            (ToolKind::GalleryDownload, vec!["pixiv", "x.com"]),
        ]);
        let res = r.resolve(ToolKind::Automatic, "https://x.com/someone/status/1").unwrap();
        assert_eq!(res.resolved, ToolKind::GalleryDownload);
        assert_eq!(res.command.program, "gallery-dl");
    }

    #[test]
    fn test_automatic_invalid_url() {
        let r = resolver(vec![(ToolKind::VideoDownload, vec!["youtube"])]);
        assert!(matches!(
            r.resolve(ToolKind::Automatic, "not-a-url"),
            Err(AppError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_automatic_with_empty_mapping() {
        let r = resolver(vec![]);
        assert!(matches!(
            r.resolve(ToolKind::Automatic, "https://example.com/x"),
            Err(AppError::UnresolvedAutomatic { ref domain }) if domain == "example.com"
        ));
    }

    #[test]
    fn test_resolved_ytdlp_command_uses_config_file() {
        let r = resolver(vec![(ToolKind::AudioExtract, vec!["youtube"])])
            .with_ytdlp_config(Some(PathBuf::from("/cfg/yt-dlp.conf")));
        let res = r.resolve(ToolKind::Automatic, "https://youtube.com/watch?v=1").unwrap();
        assert_eq!(res.command.args[0], "--config-location");
        assert_eq!(res.command.args[1], "/cfg/yt-dlp.conf");
    }

    #[test]
    fn test_plan_keeps_requested_and_resolved() {
        let r = resolver(vec![(ToolKind::GenericVideo, vec!["vimeo"])]);
        let job = r.plan(ToolKind::Automatic, "https://vimeo.com/1").unwrap();
        assert_eq!(job.requested, ToolKind::Automatic);
        assert_eq!(job.resolved, ToolKind::GenericVideo);
        assert_eq!(job.download_dir, PathBuf::from("/base"));
    }
}
