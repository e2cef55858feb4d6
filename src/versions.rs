// src/versions.rs

use crate::{
    constants,
    error::{AppError, AppResult},
    models::Program,
};
use anyhow::anyhow;
use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use std::{process::Stdio, sync::LazyLock, time::Duration};
use tokio::process::Command;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v?(\d+(?:\.\d+)+(?:[-.]?\w+)?)").unwrap());
static LATEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)latest(?:\s+version)?\s*(?:is|:)\s*v?(\d+(?:\.\d+)+(?:[-.]?\w+)?)").unwrap()
});
static UP_TO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bup[\s-]to[\s-]date\b").unwrap());

/// 一个外部程序的版本检查结果。任何字段都可能未知。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub program: Program,
    pub installed: Option<String>,
    pub latest: Option<String>,
    pub up_to_date: Option<bool>,
    pub note: Option<String>,
}

impl VersionReport {
    pub fn summary(&self) -> String {
        let installed = self.installed.as_deref().unwrap_or("未知");
        let latest = self.latest.as_deref().unwrap_or("未知");
        let state = match self.up_to_date {
            Some(true) => "已是最新",
            Some(false) => "有新版本",
            None => "无法判断",
        };
        format!("{}: 已安装 {} | 最新 {} | {}", self.program, installed, latest, state)
    }
}

/// 运行外部程序并返回合并后的文本输出
#[async_trait]
pub trait ProgramProbe: Send + Sync {
    async fn output(&self, program: &str, args: &[&str]) -> AppResult<String>;
}

/// 直接在系统中运行程序，带超时
pub struct SystemProbe {
    timeout: Duration,
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(constants::VERSION_PROBE_TIMEOUT_SECS),
        }
    }
}

#[async_trait]
impl ProgramProbe for SystemProbe {
    async fn output(&self, program: &str, args: &[&str]) -> AppResult<String> {
        let run = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| AppError::Other(anyhow!("运行 '{}' 超时", program)))?
            .map_err(|source| AppError::Spawn {
                program: program.to_string(),
                source,
            })?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

/// 取第一个看起来像版本号的片段
pub fn parse_installed_version(text: &str) -> Option<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .find_map(|line| VERSION_RE.captures(line))
        .map(|caps| caps[1].to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    Latest(String),
}

/// 识别 "up to date" 或 "latest version: X" / pip 的 "LATEST: X"
pub fn parse_update_status(text: &str) -> Option<UpdateStatus> {
    if let Some(caps) = LATEST_RE.captures(text) {
        return Some(UpdateStatus::Latest(caps[1].to_string()));
    }
    if UP_TO_DATE_RE.is_match(text) {
        return Some(UpdateStatus::UpToDate);
    }
    None
}

/// 按数字逐段比较版本号，忽略前导零与末尾的 `.0`：`2024.08.06` 与 `2024.8.6` 相同。
/// 任一段不是纯数字时返回 None。
pub fn same_version(a: &str, b: &str) -> Option<bool> {
    fn components(v: &str) -> Option<Vec<u64>> {
        let mut parts = v
            .trim()
            .trim_start_matches('v')
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        while parts.len() > 1 && parts.last() == Some(&0) {
            parts.pop();
        }
        Some(parts)
    }
    Some(components(a)? == components(b)?)
}

/// 检查一个程序。尽力而为：任何一步失败都只会让对应字段变为未知。
pub async fn check_program(probe: &dyn ProgramProbe, program: Program) -> VersionReport {
    let mut notes = Vec::new();

    let installed = match probe.output(program.executable(), &["--version"]).await {
        Ok(text) => {
            let version = parse_installed_version(&text);
            if version.is_none() {
                notes.push("无法识别已安装版本".to_string());
            }
            version
        }
        Err(e) => {
            warn!("获取 {} 版本失败: {}", program, e);
            notes.push(format!("未安装或无法运行 ({})", e));
            None
        }
    };

    let update = match probe
        .output("python3", &["-m", "pip", "index", "versions", program.package()])
        .await
    {
        Ok(text) => parse_update_status(&text),
        Err(e) => {
            debug!("查询 {} 最新版本失败: {}", program, e);
            None
        }
    };

    let (latest, up_to_date) = match (update, installed.as_deref()) {
        (Some(UpdateStatus::Latest(latest)), Some(installed)) => {
            let same = same_version(installed, &latest);
            if same.is_none() {
                notes.push("无法比较版本号".to_string());
            }
            (Some(latest), same)
        }
        (Some(UpdateStatus::Latest(latest)), None) => (Some(latest), None),
        (Some(UpdateStatus::UpToDate), _) => (installed.clone(), Some(true)),
        (None, _) => {
            notes.push("无法获取最新版本".to_string());
            (None, None)
        }
    };

    VersionReport {
        program,
        installed,
        latest,
        up_to_date,
        note: (!notes.is_empty()).then(|| notes.join("；")),
    }
}

pub async fn check_all(probe: &dyn ProgramProbe) -> Vec<VersionReport> {
    let mut reports = Vec::with_capacity(Program::ALL.len());
    for program in Program::ALL {
        reports.push(check_program(probe, program).await);
    }
    reports
}
