// src/models/mod.rs

pub mod tool;

pub use tool::{CommandSpec, Program, ToolKind};

use crate::symbols;
use colored::{ColoredString, Colorize};
use std::path::PathBuf;

/// 单个下载任务的生命周期
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Errored,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending | JobState::Running)
    }
}

/// 任务的终止结果
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum JobOutcome {
    Succeeded,
    Failed { code: Option<i32> },
    Cancelled,
    Errored(String),
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::Succeeded => JobState::Succeeded,
            JobOutcome::Failed { .. } => JobState::Failed,
            JobOutcome::Cancelled => JobState::Cancelled,
            JobOutcome::Errored(_) => JobState::Errored,
        }
    }

    /// 成功、失败与取消都会记入下载日志；启动失败不会。
    pub fn writes_log(&self) -> bool {
        !matches!(self, JobOutcome::Errored(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded)
    }

    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        String,
    ) {
        match self {
            JobOutcome::Succeeded => (&symbols::OK, |s| s.green(), "下载完成".to_string()),
            JobOutcome::Failed { code } => (
                &symbols::ERROR,
                |s| s.red(),
                format!(
                    "下载失败 (退出码: {})",
                    code.map_or("未知".to_string(), |c| c.to_string())
                ),
            ),
            JobOutcome::Cancelled => (&symbols::STOP, |s| s.magenta(), "已取消".to_string()),
            JobOutcome::Errored(msg) => (&symbols::ERROR, |s| s.red(), format!("执行出错: {}", msg)),
        }
    }
}

/// 一次下载尝试
#[derive(Debug, Clone)]
pub struct Job {
    pub url: String,
    pub requested: ToolKind,
    pub resolved: ToolKind,
    pub command: CommandSpec,
    pub download_dir: PathBuf,
    pub state: JobState,
}

impl Job {
    pub fn new(
        url: impl Into<String>,
        requested: ToolKind,
        resolved: ToolKind,
        command: CommandSpec,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            url: url.into(),
            requested,
            resolved,
            command,
            download_dir,
            state: JobState::Pending,
        }
    }

    /// 下载日志中的一行，不含换行符
    pub fn log_entry(&self) -> String {
        format!("{} ({}): {}", self.requested, self.resolved, self.url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub errored: usize,
    pub skipped: usize,
}

impl BatchStats {
    pub fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Succeeded => self.succeeded += 1,
            JobOutcome::Failed { .. } => self.failed += 1,
            JobOutcome::Cancelled => self.cancelled += 1,
            JobOutcome::Errored(_) => self.errored += 1,
        }
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed + self.cancelled + self.errored + self.skipped
    }
}

/// 批量任务的整体结果。`position` 为第一个未能自然完成的条目 (从 1 开始)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed(BatchStats),
    CancelledAt { position: usize, total: usize, stats: BatchStats },
}

impl BatchOutcome {
    pub fn stats(&self) -> &BatchStats {
        match self {
            BatchOutcome::Completed(stats) | BatchOutcome::CancelledAt { stats, .. } => stats,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        match self {
            BatchOutcome::Completed(stats) => {
                stats.failed == 0 && stats.errored == 0 && stats.cancelled == 0
            }
            BatchOutcome::CancelledAt { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_format() {
        let job = Job::new(
            "https://x.com/a",
            ToolKind::Automatic,
            ToolKind::GalleryDownload,
            CommandSpec::new("gallery-dl", vec![]),
            PathBuf::from("/tmp"),
        );
        assert_eq!(job.log_entry(), "Automatic (Gallery-DL): https://x.com/a");
        assert_eq!(job.state, JobState::Pending);
    }

    #[test]
    fn test_only_errored_skips_log() {
        assert!(JobOutcome::Succeeded.writes_log());
        assert!(JobOutcome::Failed { code: Some(1) }.writes_log());
        assert!(JobOutcome::Cancelled.writes_log());
        assert!(!JobOutcome::Errored("missing".into()).writes_log());
        assert!(JobOutcome::Cancelled.state().is_terminal());
    }
}
