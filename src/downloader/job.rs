// src/downloader/job.rs

use super::download_log::DownloadLog;
use crate::{
    error::AppError,
    events::{Event, EventSender, OutputStream, UnitId},
    models::{Job, JobOutcome, JobState},
    utils,
};
use log::{debug, error, info, warn};
use std::process::Stdio;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

/// 子进程输出转发顺序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputOrder {
    /// stderr 先缓存，等 stdout 读完后再统一转发
    #[default]
    StdoutFirst,
    /// 两个流读到一行就转发一行
    Interleaved,
}

/// 执行单个任务：启动子进程、转发输出、等待退出或取消。
#[derive(Debug, Clone)]
pub struct JobRunner {
    events: EventSender,
    order: OutputOrder,
}

impl JobRunner {
    pub fn new(events: EventSender, order: OutputOrder) -> Self {
        Self { events, order }
    }

    pub(crate) fn emit(&self, event: Event) {
        // 控制器已退出时消息无人接收，直接丢弃
        let _ = self.events.send(event);
    }

    pub async fn run(&self, unit: UnitId, job: &mut Job, cancel: CancellationToken) -> JobOutcome {
        let outcome = self.execute(unit, job, &cancel).await;
        job.state = outcome.state();
        info!("单元 {} 的任务 '{}' 结束: {:?}", unit, job.url, outcome);

        if outcome.writes_log() {
            let log = DownloadLog::for_download_dir(&job.download_dir);
            if let Err(e) = log.append(&job.log_entry()).await {
                error!("写入下载记录 {:?} 失败: {}", log.path(), e);
                self.emit(Event::Warning {
                    unit,
                    message: format!("写入下载记录失败: {}", e),
                });
            }
        }

        self.emit(Event::JobFinished {
            unit,
            url: job.url.clone(),
            outcome: outcome.clone(),
        });
        outcome
    }

    async fn execute(&self, unit: UnitId, job: &mut Job, cancel: &CancellationToken) -> JobOutcome {
        if let Err(e) = utils::ensure_dirs(&job.download_dir).await {
            error!("创建下载目录 {:?} 失败: {}", job.download_dir, e);
            return JobOutcome::Errored(format!("创建下载目录失败: {}", e));
        }

        self.emit(Event::CommandStarted {
            unit,
            command_line: job.command.command_line(),
        });

        let mut child = match Command::new(&job.command.program)
            .args(&job.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                let err = AppError::Spawn {
                    program: job.command.program.clone(),
                    source,
                };
                error!("单元 {}: {}", unit, err);
                return JobOutcome::Errored(err.to_string());
            }
        };
        job.state = JobState::Running;
        debug!("单元 {} 已启动进程 {:?}: {}", unit, child.id(), job.command.command_line());

        let hold_stderr = self.order == OutputOrder::StdoutFirst;
        let stdout_task = spawn_drain(child.stdout.take(), unit, OutputStream::Stdout, self.events.clone(), false);
        let stderr_task = spawn_drain(child.stderr.take(), unit, OutputStream::Stderr, self.events.clone(), hold_stderr);

        let status = tokio::select! {
            status = child.wait() => status,
            _ = cancel.cancelled() => {
                if let Err(e) = child.kill().await {
                    warn!("单元 {} 终止进程失败 (可能已退出): {}", unit, e);
                }
                stdout_task.abort();
                stderr_task.abort();
                info!("单元 {} 的进程已被强制终止", unit);
                return JobOutcome::Cancelled;
            }
        };

        // 进程已自然退出，结果以退出码为准；此时取消只会截断尚未读完的输出
        let readers = [stdout_task.abort_handle(), stderr_task.abort_handle()];
        let held = tokio::select! {
            (_, held) = async { tokio::join!(stdout_task, stderr_task) } => held.unwrap_or_default(),
            _ = cancel.cancelled() => {
                readers.iter().for_each(|reader| reader.abort());
                Vec::new()
            }
        };
        for line in held {
            self.emit(Event::Output {
                unit,
                stream: OutputStream::Stderr,
                line,
            });
        }

        match status {
            Ok(status) if status.success() => JobOutcome::Succeeded,
            Ok(status) => {
                let err = AppError::ChildProcessFailure {
                    program: job.command.program.clone(),
                    code: status.code().map_or("无 (被信号终止)".to_string(), |c| c.to_string()),
                };
                warn!("单元 {}: {}", unit, err);
                JobOutcome::Failed { code: status.code() }
            }
            Err(e) => {
                error!("单元 {} 等待进程退出时出错: {}", unit, e);
                JobOutcome::Errored(e.to_string())
            }
        }
    }
}

/// 在独立任务中逐行读取一个输出流。`hold` 为 true 时不转发，读完后整体返回。
fn spawn_drain<R>(
    reader: Option<R>,
    unit: UnitId,
    stream: OutputStream,
    events: EventSender,
    hold: bool,
) -> JoinHandle<Vec<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut held = Vec::new();
        let Some(reader) = reader else {
            return held;
        };
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    // 进度条类输出用 '\r' 覆盖同一行，这里拆成独立的行
                    let text = String::from_utf8_lossy(&buf);
                    for line in text.split(['\r', '\n']).filter(|l| !l.trim().is_empty()) {
                        if hold {
                            held.push(line.to_string());
                        } else {
                            let _ = events.send(Event::Output {
                                unit,
                                stream,
                                line: line.to_string(),
                            });
                        }
                    }
                }
                Err(e) => {
                    warn!("单元 {} 读取 {:?} 失败: {}", unit, stream, e);
                    break;
                }
            }
        }
        held
    })
}
