// src/downloader/supervisor.rs

use super::{
    job::{JobRunner, OutputOrder},
    sequencer::{self, JobBatch},
};
use crate::{
    events::{Event, EventSender, UnitId, UnitResult},
    models::Job,
    resolver::JobPlanner,
    utils,
};
use log::{debug, error, info};
use std::{collections::BTreeMap, future::Future, sync::Arc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct UnitHandle {
    label: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// 持有所有后台单元的句柄与取消令牌。
///
/// 每个单元结束时恰好发送一次 `Event::UnitFinished`；句柄由控制器在收到该消息后调用 `release` 回收。
pub struct Supervisor {
    next_id: u64,
    units: BTreeMap<UnitId, UnitHandle>,
    events: EventSender,
    runner: JobRunner,
}

impl Supervisor {
    pub fn new(events: EventSender, order: OutputOrder) -> Self {
        Self {
            next_id: 1,
            units: BTreeMap::new(),
            runner: JobRunner::new(events.clone(), order),
            events,
        }
    }

    fn allocate(&mut self) -> UnitId {
        let unit = UnitId(self.next_id);
        self.next_id += 1;
        unit
    }

    pub fn submit_job(&mut self, job: Job) -> UnitId {
        let unit = self.allocate();
        let cancel = CancellationToken::new();
        let label = format!("{} - {}", job.requested, utils::truncate_text(&job.url, 60));
        let runner = self.runner.clone();
        let token = cancel.clone();
        let work = async move {
            let mut job = job;
            UnitResult::Job(runner.run(unit, &mut job, token).await)
        };
        self.spawn_unit(unit, label, cancel, work);
        unit
    }

    pub fn submit_batch(&mut self, batch: JobBatch, planner: Arc<dyn JobPlanner>) -> UnitId {
        let unit = self.allocate();
        let cancel = CancellationToken::new();
        let label = format!("批量 {} 项 - {}", batch.len(), batch.tool);
        let runner = self.runner.clone();
        let token = cancel.clone();
        let work = async move {
            UnitResult::Batch(
                sequencer::run_batch(unit, &batch, planner.as_ref(), &runner, &token).await,
            )
        };
        self.spawn_unit(unit, label, cancel, work);
        unit
    }

    fn spawn_unit<F>(&mut self, unit: UnitId, label: String, cancel: CancellationToken, work: F)
    where
        F: Future<Output = UnitResult> + Send + 'static,
    {
        info!("启动单元 {}: {}", unit, label);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            // 内层任务即使 panic，外层也会补发结束消息
            let result = match tokio::spawn(work).await {
                Ok(result) => result,
                Err(e) => {
                    error!("单元 {} 异常终止: {}", unit, e);
                    UnitResult::Aborted(e.to_string())
                }
            };
            let _ = events.send(Event::UnitFinished { unit, result });
        });
        self.units.insert(unit, UnitHandle { label, cancel, task });
    }

    /// 请求取消。单元不存在或已在取消中时返回 false，不产生任何影响。
    pub fn cancel(&self, unit: UnitId) -> bool {
        match self.units.get(&unit) {
            Some(handle) if !handle.cancel.is_cancelled() => {
                info!("取消单元 {}: {}", unit, handle.label);
                handle.cancel.cancel();
                true
            }
            _ => {
                debug!("单元 {} 不存在或已取消，忽略", unit);
                false
            }
        }
    }

    pub fn cancel_all(&self) -> usize {
        self.units
            .keys()
            .filter(|unit| self.cancel(**unit))
            .count()
    }

    pub fn active_count(&self) -> usize {
        self.units.len()
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.units.contains_key(&unit)
    }

    pub fn units(&self) -> Vec<(UnitId, String)> {
        self.units
            .iter()
            .map(|(unit, handle)| (*unit, handle.label.clone()))
            .collect()
    }

    /// 回收已结束单元的句柄
    pub fn release(&mut self, unit: UnitId) -> Option<String> {
        self.units.remove(&unit).map(|handle| handle.label)
    }

    /// 取消全部单元并等待其结束
    pub async fn shutdown(&mut self) {
        let cancelled = self.cancel_all();
        if cancelled > 0 {
            info!("退出前取消了 {} 个单元", cancelled);
        }
        let handles: Vec<_> = std::mem::take(&mut self.units)
            .into_values()
            .map(|handle| handle.task)
            .collect();
        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                error!("等待单元结束时出错: {}", e);
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::{
        events::{self, EventReceiver},
        models::{CommandSpec, JobOutcome, ToolKind},
    };
    use std::time::Duration;

    fn job(script: &str, base: &std::path::Path) -> Job {
        Job::new(
            "https://example.com/v",
            ToolKind::VideoDownload,
            ToolKind::VideoDownload,
            CommandSpec::new("sh", vec!["-c".into(), script.into()]),
            base.to_path_buf(),
        )
    }

    async fn next_finished(rx: &mut EventReceiver) -> (UnitId, UnitResult) {
        loop {
            match tokio::time::timeout(Duration::from_secs(20), rx.recv()).await {
                Ok(Some(Event::UnitFinished { unit, result })) => return (unit, result),
                Ok(Some(_)) => continue,
                other => panic!("未收到结束消息: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_each_unit_finishes_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = events::channel();
        let mut supervisor = Supervisor::new(tx, OutputOrder::StdoutFirst);

        let first = supervisor.submit_job(job("exit 0", dir.path()));
        let second = supervisor.submit_job(job("exit 2", dir.path()));
        assert_eq!(supervisor.active_count(), 2);

        let mut finished = vec![next_finished(&mut rx).await, next_finished(&mut rx).await];
        finished.sort_by_key(|(unit, _)| *unit);
        assert_eq!(finished[0], (first, UnitResult::Job(JobOutcome::Succeeded)));
        assert_eq!(finished[1], (second, UnitResult::Job(JobOutcome::Failed { code: Some(2) })));

        supervisor.release(first);
        supervisor.release(second);
        assert_eq!(supervisor.active_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = events::channel();
        let mut supervisor = Supervisor::new(tx, OutputOrder::StdoutFirst);

        let unit = supervisor.submit_job(job("exec sleep 30", dir.path()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(supervisor.cancel(unit));
        assert!(!supervisor.cancel(unit));

        let (finished, result) = next_finished(&mut rx).await;
        assert_eq!(finished, unit);
        assert_eq!(result, UnitResult::Job(JobOutcome::Cancelled));
        supervisor.release(unit);
        assert!(!supervisor.cancel(unit));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_and_joins() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = events::channel();
        let mut supervisor = Supervisor::new(tx, OutputOrder::Interleaved);
        supervisor.submit_job(job("exec sleep 30", dir.path()));
        supervisor.submit_job(job("exec sleep 30", dir.path()));

        tokio::time::timeout(Duration::from_secs(20), supervisor.shutdown())
            .await
            .unwrap();

        assert_eq!(supervisor.active_count(), 0);
        let finished = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|e| matches!(e, Event::UnitFinished { .. }))
            .count();
        assert_eq!(finished, 2);
    }
}
