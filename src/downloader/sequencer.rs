// src/downloader/sequencer.rs

use super::job::JobRunner;
use crate::{
    events::{Event, UnitId},
    models::{BatchOutcome, BatchStats, JobOutcome, ToolKind},
    resolver::JobPlanner,
};
use log::{debug, info, warn};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 批量模式下一次提交的全部链接
#[derive(Debug, Clone)]
pub struct JobBatch {
    pub urls: Vec<String>,
    pub tool: ToolKind,
    pub delay: Duration,
}

impl JobBatch {
    pub fn new(urls: Vec<String>, tool: ToolKind, delay: Duration) -> Self {
        Self { urls, tool, delay }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// 严格按顺序逐个执行，任务之间等待固定时长。
///
/// 每轮开始前检查取消标记；无法解析的链接直接跳过，不写日志也不中断批次。
pub async fn run_batch(
    unit: UnitId,
    batch: &JobBatch,
    planner: &dyn JobPlanner,
    runner: &JobRunner,
    cancel: &CancellationToken,
) -> BatchOutcome {
    let total = batch.len();
    let mut stats = BatchStats {
        total,
        ..Default::default()
    };
    info!("单元 {} 开始批量任务，共 {} 个链接，工具: {}", unit, total, batch.tool);

    for (i, url) in batch.urls.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("单元 {} 在第 {}/{} 项前被取消", unit, i + 1, total);
            return BatchOutcome::CancelledAt {
                position: i + 1,
                total,
                stats,
            };
        }

        let mut job = match planner.plan(batch.tool, url) {
            Ok(job) => job,
            Err(e) => {
                warn!("批量任务跳过无法解析的链接 '{}': {}", url, e);
                stats.skipped += 1;
                runner.emit(Event::ItemSkipped {
                    unit,
                    url: url.clone(),
                    reason: e.to_string(),
                });
                runner.emit(Event::BatchProgress {
                    unit,
                    completed: i + 1,
                    total,
                });
                continue;
            }
        };

        let outcome = runner.run(unit, &mut job, cancel.child_token()).await;
        stats.record(&outcome);
        runner.emit(Event::BatchProgress {
            unit,
            completed: i + 1,
            total,
        });

        if outcome == JobOutcome::Cancelled && cancel.is_cancelled() {
            info!("单元 {} 的第 {}/{} 项被取消，批量任务停止", unit, i + 1, total);
            return BatchOutcome::CancelledAt {
                position: i + 1,
                total,
                stats,
            };
        }

        if i + 1 < total {
            debug!("单元 {} 等待 {:?} 后开始下一项", unit, batch.delay);
            tokio::select! {
                _ = tokio::time::sleep(batch.delay) => {}
                _ = cancel.cancelled() => {}
            }
        }
    }

    info!("单元 {} 批量任务完成: {:?}", unit, stats);
    BatchOutcome::Completed(stats)
}
