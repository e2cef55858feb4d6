// src/app.rs

use crate::{
    config::{AppConfig, AutomaticMapping, ConfigStore, Theme},
    constants,
    downloader::{JobBatch, OutputOrder, StatusCoordinator, Supervisor},
    error::{AppError, AppResult},
    events::{self, Event, EventReceiver, EventSender, OutputStream, UnitId, UnitResult},
    models::{BatchOutcome, JobOutcome, ToolKind},
    resolver::{JobPlanner, Resolver},
    symbols,
    ui::{self, Console},
    utils,
    versions::{self, SystemProbe},
};
use clap::ValueEnum;
use colored::*;
use log::{debug, info, warn};
use std::{
    io::BufRead,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::sync::mpsc;

/// 控制器持有的全部应用状态
pub struct AppState {
    pub store: ConfigStore,
    pub config: AppConfig,
    pub mapping: Arc<AutomaticMapping>,
    pub tool: ToolKind,
    pub bulk_delay: Duration,
    /// 创建失败时为 None，yt-dlp 将使用其默认配置
    pub ytdlp_config: Option<PathBuf>,
}

impl AppState {
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.mapping.clone(), self.config.download_dir.clone())
            .with_ytdlp_config(self.ytdlp_config.clone())
    }

    /// 修改并保存下载目录，`None` 表示恢复默认值
    pub fn set_download_dir(&mut self, dir: Option<&Path>) -> AppResult<PathBuf> {
        let target = match dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                dunce::canonicalize(dir)?
            }
            None => AppConfig::default_download_dir(),
        };
        self.config.download_dir = target.clone();
        self.store.save(&self.config)?;
        info!("下载目录已设置为 {}", target.display());
        Ok(target)
    }

    pub fn set_theme(&mut self, theme: Theme) -> AppResult<()> {
        self.config.theme = theme;
        theme.apply();
        self.store.save(&self.config)
    }
}

/// 交互模式下当前的输入状态
enum InputMode {
    Command,
    Bulk(Vec<String>),
    ConfirmStop(Vec<UnitId>),
    ConfirmQuit,
}

impl InputMode {
    fn prompt(&self) -> &'static str {
        match self {
            InputMode::Command => "请输入链接或命令 (help 查看帮助)",
            InputMode::Bulk(_) => "批量链接 (空行结束)",
            InputMode::ConfirmStop(_) | InputMode::ConfirmQuit => "请确认 (y/N)",
        }
    }
}

#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// 唯一的 "界面" 上下文：所有状态修改与终端输出都在这里发生，
/// 后台单元只通过事件通道与之通信。
pub struct Controller {
    state: AppState,
    status: StatusCoordinator,
    supervisor: Supervisor,
    events: EventReceiver,
    sender: EventSender,
    console: Console,
    unsuccessful: usize,
    interrupted: bool,
}

impl Controller {
    pub fn new(state: AppState, order: OutputOrder) -> Self {
        let (sender, events) = events::channel();
        Self {
            state,
            status: StatusCoordinator::new(),
            supervisor: Supervisor::new(sender.clone(), order),
            events,
            sender,
            console: Console::new(),
            unsuccessful: 0,
            interrupted: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_any_job_active(&self) -> bool {
        self.status.is_any_job_active()
    }

    pub fn controls_enabled(&self) -> bool {
        self.status.controls_enabled()
    }

    /// 已结束但未成功的单元数
    pub fn unsuccessful(&self) -> usize {
        self.unsuccessful
    }

    /// 是否因 Ctrl+C 取消过任务
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// 在控制器上解析并提交单个任务。解析失败时任务不会启动，也不写日志。
    pub fn submit_url(&mut self, url: &str) -> AppResult<UnitId> {
        let job = self.state.resolver().plan(self.state.tool, url)?;
        let unit = self.supervisor.submit_job(job);
        self.status.unit_started(unit);
        Ok(unit)
    }

    pub fn submit_batch(&mut self, urls: Vec<String>) -> Option<UnitId> {
        if urls.is_empty() {
            self.console.warn("没有可下载的链接。");
            return None;
        }
        let total = urls.len();
        let batch = JobBatch::new(urls, self.state.tool, self.state.bulk_delay);
        let planner: Arc<dyn JobPlanner> = Arc::new(self.state.resolver());
        let unit = self.supervisor.submit_batch(batch, planner);
        self.status.unit_started(unit);
        self.console.info(&format!(
            "批量任务 {} 已开始: 共 {} 个链接，工具 {}，间隔 {} 秒",
            unit,
            total,
            self.state.tool,
            self.state.bulk_delay.as_secs()
        ));
        self.console.start_bar(unit, total);
        Some(unit)
    }

    fn report_submit_error(&self, url: &str, err: &AppError) {
        warn!("任务提交失败 '{}': {}", url, err);
        let url_line = format!("链接: {}", url);
        let reason = err.to_string();
        let title = if err.is_preflight() { "无法解析链接" } else { "无法开始下载" };
        self.console.error_box(title, &[url_line.as_str(), reason.as_str()]);
    }

    pub fn spawn_version_check(&self) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let probe = SystemProbe::default();
            for report in versions::check_all(&probe).await {
                if sender.send(Event::VersionReport(report)).is_err() {
                    break;
                }
            }
        });
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::CommandStarted { unit, command_line } => {
                self.console
                    .line(&format!("{} {} 运行: {}", *symbols::RUN, unit, command_line.dimmed()));
            }
            Event::Output { unit, stream, line } => {
                let prefix = unit.to_string().dimmed();
                match stream {
                    OutputStream::Stdout => self.console.line(&format!("{} {}", prefix, line)),
                    OutputStream::Stderr => {
                        self.console.line(&format!("{} {}", prefix, line.yellow()))
                    }
                }
            }
            Event::JobFinished { unit, url, outcome } => self.report_job(unit, &url, &outcome),
            Event::ItemSkipped { unit, url, reason } => {
                self.console.warn(&format!(
                    "{} 跳过 {}: {}",
                    unit,
                    utils::truncate_text(&url, constants::URL_TRUNCATE_LENGTH),
                    reason
                ));
            }
            Event::BatchProgress { unit, completed, total } => {
                debug!("单元 {} 进度 {}/{}", unit, completed, total);
                self.console.update_bar(unit, completed, total);
                if !self.console.has_bar(unit) {
                    self.console.info(&format!("{} 进度 {}/{}", unit, completed, total));
                }
            }
            Event::Warning { unit, message } => {
                self.console.warn(&format!("{} {}", unit, message));
            }
            Event::VersionReport(report) => {
                let mut text = report.summary();
                if let Some(note) = &report.note {
                    text.push_str(&format!(" ({})", note));
                }
                match report.up_to_date {
                    Some(false) => self.console.warn(&text),
                    _ => self.console.info(&text),
                }
            }
            Event::UnitFinished { unit, result } => self.finish_unit(unit, result),
        }
    }

    fn report_job(&self, unit: UnitId, url: &str, outcome: &JobOutcome) {
        let (symbol, color_fn, msg) = outcome.get_display_info();
        let short_url = utils::truncate_text(url, constants::URL_TRUNCATE_LENGTH);
        self.console
            .line(&format!("{} {} {} {}", symbol, unit, short_url, color_fn(msg.clone().into())));

        // 批量任务中的单项失败只显示状态行，不弹出错误框
        if self.console.has_bar(unit) {
            return;
        }
        match outcome {
            JobOutcome::Failed { .. } => self.console.error_box("下载失败", &[url, msg.as_str()]),
            JobOutcome::Errored(_) => self.console.error_box("执行出错", &[url, msg.as_str()]),
            _ => {}
        }
    }

    fn finish_unit(&mut self, unit: UnitId, result: UnitResult) {
        let label = self.supervisor.release(unit).unwrap_or_default();
        self.console.finish_bar(unit);
        info!("单元 {} ({}) 结束: {:?}", unit, label, result);

        match &result {
            UnitResult::Batch(BatchOutcome::Completed(stats)) => {
                self.console.ok(&format!("批量任务 {} 已全部处理完毕", unit));
                self.console.line(&format!(
                    "{} | {} | {} | 总计: {}",
                    format!("成功: {}", stats.succeeded).green(),
                    format!("失败: {}", stats.failed + stats.errored).red(),
                    format!("跳过: {}", stats.skipped).yellow(),
                    stats.total
                ));
            }
            UnitResult::Batch(BatchOutcome::CancelledAt { position, total, stats }) => {
                self.console.line(&format!(
                    "{} 批量任务 {} 已在第 {}/{} 项取消 (已完成 {} 项)",
                    *symbols::STOP,
                    unit,
                    position,
                    total,
                    stats.attempted()
                ));
            }
            UnitResult::Aborted(msg) => {
                self.console.error(&format!("单元 {} 异常终止: {}", unit, msg));
            }
            UnitResult::Job(_) => {}
        }
        if !result.is_success() {
            self.unsuccessful += 1;
        }

        if self.status.unit_finished(unit) {
            self.console.info("所有任务均已结束，下载目录与主题设置已解锁。");
        }
    }

    /// 处理事件直到没有活动单元。Ctrl+C 会取消全部单元，再按一次直接退出。
    pub async fn run_until_idle(&mut self) {
        while self.status.is_any_job_active() {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    if self.interrupted {
                        println!("\n{} 用户强制中断程序。", *symbols::WARN);
                        std::process::exit(130);
                    }
                    self.interrupted = true;
                    let count = self.supervisor.cancel_all();
                    self.console.warn(&format!(
                        "正在停止 {} 个任务 (再按一次 {} 立即退出)",
                        count,
                        *symbols::CTRL_C
                    ));
                }
            }
        }
    }

    /// 取消所有单元、等待其结束，并把剩余事件处理完
    pub async fn shutdown(&mut self) {
        self.supervisor.shutdown().await;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn print_config(&self) {
        let config = &self.state.config;
        let mut lines = vec![
            format!("配置目录: {}", self.state.store.dir().display()),
            format!("下载目录: {}", config.download_dir.display()),
            format!("主题: {:?}", config.theme),
            format!("批量间隔: {} 秒", self.state.bulk_delay.as_secs()),
            format!(
                "yt-dlp 配置: {}",
                self.state
                    .ytdlp_config
                    .as_deref()
                    .map_or("(未使用)".to_string(), |p| p.display().to_string())
            ),
            format!("当前工具: {} ({})", self.state.tool, self.state.tool.cli_name()),
            format!("自动模式映射 ({}):", self.state.store.mapping_path().display()),
        ];
        if self.state.mapping.is_empty() {
            lines.push("  (空，自动模式无法解析任何链接)".to_string());
        }
        for (tool, substrings) in self.state.mapping.entries() {
            lines.push(format!("  {} <- {}", tool, substrings.join(", ")));
        }
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        ui::box_message("当前配置", &refs, |s| s.cyan());
    }

    fn print_jobs(&self) {
        let units = self.supervisor.units();
        if units.is_empty() {
            self.console.info("当前没有正在运行的任务。");
            return;
        }
        ui::print_sub_header(&format!("运行中的任务 ({})", units.len()));
        for (unit, label) in units {
            self.console.line(&format!("  {} {}", unit.to_string().yellow(), label));
        }
    }

    /// 交互模式主循环
    pub async fn run_interactive(&mut self) -> AppResult<()> {
        ui::print_header("交互模式");
        println!(
            "输入链接即可使用当前工具 ({}) 下载，输入 help 查看命令。按 {} 可随时退出。",
            self.state.tool,
            *symbols::CTRL_C
        );
        self.spawn_version_check();

        let mut input = spawn_stdin_reader();
        let mut mode = InputMode::Command;
        ui::print_prompt(mode.prompt());

        loop {
            tokio::select! {
                line = input.recv() => {
                    let Some(line) = line else { break };
                    if self.handle_input(line.trim(), &mut mode) == Flow::Quit {
                        break;
                    }
                    ui::print_prompt(mode.prompt());
                }
                Some(event) = self.events.recv() => self.handle_event(event),
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    break;
                }
            }
        }

        if self.status.is_any_job_active() {
            self.console
                .warn(&format!("正在停止 {} 个任务...", self.supervisor.active_count()));
        }
        self.shutdown().await;
        println!("\n{} 退出交互模式。", *symbols::INFO);
        Ok(())
    }

    fn handle_input(&mut self, line: &str, mode: &mut InputMode) -> Flow {
        match std::mem::replace(mode, InputMode::Command) {
            InputMode::Bulk(mut urls) => {
                if line.is_empty() || line.eq_ignore_ascii_case("end") {
                    self.submit_batch(urls);
                } else {
                    if utils::looks_like_url(line) {
                        urls.push(line.to_string());
                    } else {
                        self.console.warn(&format!("'{}' 不是有效链接，已忽略。", line));
                    }
                    *mode = InputMode::Bulk(urls);
                }
                Flow::Continue
            }
            InputMode::ConfirmStop(units) => {
                if is_yes(line) {
                    for unit in units {
                        if self.supervisor.cancel(unit) {
                            self.console.line(&format!("{} 正在停止 {}", *symbols::STOP, unit));
                        } else {
                            self.console.info(&format!("{} 已结束或正在停止。", unit));
                        }
                    }
                } else {
                    self.console.info("已放弃停止。");
                }
                Flow::Continue
            }
            InputMode::ConfirmQuit => {
                if is_yes(line) {
                    Flow::Quit
                } else {
                    Flow::Continue
                }
            }
            InputMode::Command => self.handle_command(line, mode),
        }
    }

    fn handle_command(&mut self, line: &str, mode: &mut InputMode) -> Flow {
        if line.is_empty() {
            return Flow::Continue;
        }
        if utils::looks_like_url(line) {
            match self.submit_url(line) {
                Ok(unit) => self
                    .console
                    .info(&format!("任务 {} 已提交 ({})", unit, self.state.tool)),
                Err(e) => self.report_submit_error(line, &e),
            }
            return Flow::Continue;
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        match command.to_lowercase().as_str() {
            "help" | "?" => {
                let lines: Vec<&str> = constants::HELP_INTERACTIVE.lines().skip(1).collect();
                ui::box_message("交互命令", &lines, |s| s.cyan());
            }
            "tool" => match ToolKind::from_identifier(arg) {
                Some(tool) => {
                    self.state.tool = tool;
                    self.console.ok(&format!("当前工具: {}", tool));
                }
                None => self.console.warn(&format!(
                    "未知工具 '{}'。可选: {}",
                    arg,
                    ToolKind::value_variants()
                        .iter()
                        .map(ToolKind::cli_name)
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            },
            "bulk" => {
                self.console.info("请逐行输入链接，输入空行后开始批量下载。");
                *mode = InputMode::Bulk(Vec::new());
            }
            "jobs" => self.print_jobs(),
            "stop" => {
                if let Some(units) = self.select_units_to_stop(arg) {
                    let names: Vec<String> = units.iter().map(UnitId::to_string).collect();
                    self.console
                        .warn(&format!("确定要停止任务 {} 吗？已下载的部分不会被清理。", names.join(", ")));
                    *mode = InputMode::ConfirmStop(units);
                }
            }
            "dir" => self.change_download_dir(arg),
            "theme" => self.change_theme(arg),
            "versions" => {
                self.console.info("正在后台检查外部工具版本...");
                self.spawn_version_check();
            }
            "config" => self.print_config(),
            "quit" | "exit" => {
                if self.status.is_any_job_active() {
                    self.console.warn(&format!(
                        "仍有 {} 个任务在运行，退出将停止它们。确定退出吗？",
                        self.supervisor.active_count()
                    ));
                    *mode = InputMode::ConfirmQuit;
                } else {
                    return Flow::Quit;
                }
            }
            other => self
                .console
                .warn(&format!("无法识别的输入 '{}'，输入 help 查看帮助。", other)),
        }
        Flow::Continue
    }

    fn select_units_to_stop(&self, arg: &str) -> Option<Vec<UnitId>> {
        let active = self.status.active_units();
        if arg.is_empty() {
            return match active.as_slice() {
                [] => {
                    self.console.info("当前没有正在运行的任务。");
                    None
                }
                [only] => Some(vec![*only]),
                _ => {
                    self.console.warn("有多个任务在运行，请指定编号，例如: stop 2");
                    None
                }
            };
        }
        match arg.trim_start_matches('#').parse::<u64>().map(UnitId) {
            Ok(unit) if self.supervisor.contains(unit) => Some(vec![unit]),
            Ok(unit) => {
                self.console.warn(&format!("任务 {} 不存在或已结束。", unit));
                None
            }
            Err(_) => {
                self.console.warn(&format!("无效的任务编号 '{}'。", arg));
                None
            }
        }
    }

    fn change_download_dir(&mut self, arg: &str) {
        if let Err(e) = self.status.ensure_unlocked("下载目录") {
            self.console.warn(&e.to_string());
            return;
        }
        let result = match arg {
            "" => {
                self.console.info(&format!(
                    "当前下载目录: {}",
                    self.state.config.download_dir.display()
                ));
                return;
            }
            "reset" => self.state.set_download_dir(None),
            path => self.state.set_download_dir(Some(Path::new(path))),
        };
        match result {
            Ok(dir) => self.console.ok(&format!("下载目录已设置为: {}", dir.display())),
            Err(e) => self.console.error(&format!("修改下载目录失败: {}", e)),
        }
    }

    fn change_theme(&mut self, arg: &str) {
        if let Err(e) = self.status.ensure_unlocked("主题") {
            self.console.warn(&e.to_string());
            return;
        }
        match Theme::from_str(arg, true) {
            Ok(theme) => match self.state.set_theme(theme) {
                Ok(()) => self.console.ok(&format!("主题已切换为 {:?}", theme)),
                Err(e) => self.console.error(&format!("保存主题失败: {}", e)),
            },
            Err(_) => self
                .console
                .warn(&format!("未知主题 '{}'。可选: auto, color, plain", arg)),
        }
    }
}

fn is_yes(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "y" | "yes")
}

/// 在独立线程中阻塞读取标准输入，逐行转发给控制器。输入结束时通道关闭。
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("读取标准输入失败: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::models::{CommandSpec, Job};

    fn controller(dir: &Path, entries: Vec<(ToolKind, Vec<String>)>) -> Controller {
        let store = ConfigStore::new(dir.join("config"));
        let config = AppConfig {
            download_dir: dir.join("downloads"),
            ..Default::default()
        };
        let state = AppState {
            store,
            config,
            mapping: Arc::new(AutomaticMapping::new(entries)),
            tool: ToolKind::Automatic,
            bulk_delay: Duration::ZERO,
            ytdlp_config: None,
        };
        Controller::new(state, OutputOrder::StdoutFirst)
    }

    #[tokio::test]
    async fn test_preflight_failure_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path(), vec![]);

        let err = controller.submit_url("https://example.com/x").unwrap_err();
        assert!(matches!(err, AppError::UnresolvedAutomatic { .. }));
        let err = controller.submit_url("not-a-url").unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl(_)));

        assert!(!controller.is_any_job_active());
        assert!(controller.controls_enabled());
        assert!(!dir.path().join("downloads/log/download.log").exists());
    }

    #[tokio::test]
    async fn test_controls_locked_while_running_and_unlocked_after() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path(), vec![]);
        let job = Job::new(
            "https://example.com/a",
            ToolKind::VideoDownload,
            ToolKind::VideoDownload,
            CommandSpec::new("sh", vec!["-c".into(), "sleep 0.3".into()]),
            dir.path().join("downloads"),
        );
        let unit = controller.supervisor.submit_job(job);
        controller.status.unit_started(unit);
        assert!(controller.is_any_job_active());
        assert!(!controller.controls_enabled());

        let mut mode = InputMode::Command;
        controller.handle_input("dir /tmp/elsewhere", &mut mode);
        controller.handle_input("theme plain", &mut mode);
        assert_eq!(controller.state().config.download_dir, dir.path().join("downloads"));
        assert_eq!(controller.state().config.theme, Theme::Auto);

        tokio::time::timeout(Duration::from_secs(20), controller.run_until_idle())
            .await
            .unwrap();
        assert!(!controller.is_any_job_active());
        assert!(controller.controls_enabled());
        assert_eq!(controller.unsuccessful(), 0);
    }

    #[tokio::test]
    async fn test_bulk_input_collects_until_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path(), vec![]);
        let mut mode = InputMode::Command;

        controller.handle_input("bulk", &mut mode);
        controller.handle_input("https://nowhere.example/1", &mut mode);
        controller.handle_input("not a url", &mut mode);
        controller.handle_input("https://nowhere.example/2", &mut mode);
        assert!(matches!(&mode, InputMode::Bulk(urls) if urls.len() == 2));

        controller.handle_input("", &mut mode);
        assert!(matches!(mode, InputMode::Command));
        assert!(controller.is_any_job_active());

        // 两个链接都无法解析，被跳过，批量任务仍会正常结束
        tokio::time::timeout(Duration::from_secs(20), controller.run_until_idle())
            .await
            .unwrap();
        assert!(controller.controls_enabled());
        assert_eq!(controller.unsuccessful(), 0);
    }

    #[tokio::test]
    async fn test_stop_asks_before_killing() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path(), vec![]);
        let job = Job::new(
            "https://example.com/long",
            ToolKind::VideoDownload,
            ToolKind::VideoDownload,
            CommandSpec::new("sh", vec!["-c".into(), "exec sleep 30".into()]),
            dir.path().join("downloads"),
        );
        let unit = controller.supervisor.submit_job(job);
        controller.status.unit_started(unit);
        let mut mode = InputMode::Command;

        controller.handle_input("stop", &mut mode);
        assert!(matches!(&mode, InputMode::ConfirmStop(units) if units == &vec![unit]));
        controller.handle_input("n", &mut mode);
        assert!(matches!(mode, InputMode::Command));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(controller.supervisor.contains(unit));
        assert!(controller.is_any_job_active());

        controller.handle_input(&format!("stop {}", unit), &mut mode);
        controller.handle_input("y", &mut mode);
        tokio::time::timeout(Duration::from_secs(10), controller.run_until_idle())
            .await
            .unwrap();

        assert!(!controller.supervisor.contains(unit));
        assert!(controller.controls_enabled());
        assert_eq!(controller.unsuccessful(), 1);
        // 被取消的任务同样记入下载日志
        let log = std::fs::read_to_string(dir.path().join("downloads/log/download.log")).unwrap();
        assert_eq!(log.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_stop_without_matching_job_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller(dir.path(), vec![]);
        let mut mode = InputMode::Command;

        controller.handle_input("stop", &mut mode);
        assert!(matches!(mode, InputMode::Command));

        controller.handle_input("stop 42", &mut mode);
        assert!(matches!(mode, InputMode::Command));

        controller.handle_input("tool yt-audio", &mut mode);
        assert_eq!(controller.state().tool, ToolKind::AudioExtract);
    }
}
