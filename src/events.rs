// src/events.rs

use crate::{
    models::{BatchOutcome, JobOutcome},
    versions::VersionReport,
};
use std::fmt;
use tokio::sync::mpsc;

/// 一个后台执行单元 (单个任务或一个批量任务) 的编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitResult {
    Job(JobOutcome),
    Batch(BatchOutcome),
    /// 后台任务异常终止 (panic)
    Aborted(String),
}

impl UnitResult {
    pub fn is_success(&self) -> bool {
        match self {
            UnitResult::Job(outcome) => outcome.is_success(),
            UnitResult::Batch(outcome) => outcome.all_succeeded(),
            UnitResult::Aborted(_) => false,
        }
    }
}

/// 后台单元发往控制器的消息。后台单元从不直接打印。
#[derive(Debug, Clone)]
pub enum Event {
    CommandStarted {
        unit: UnitId,
        command_line: String,
    },
    Output {
        unit: UnitId,
        stream: OutputStream,
        line: String,
    },
    JobFinished {
        unit: UnitId,
        url: String,
        outcome: JobOutcome,
    },
    ItemSkipped {
        unit: UnitId,
        url: String,
        reason: String,
    },
    BatchProgress {
        unit: UnitId,
        completed: usize,
        total: usize,
    },
    Warning {
        unit: UnitId,
        message: String,
    },
    VersionReport(VersionReport),
    /// 每个单元恰好发送一次
    UnitFinished {
        unit: UnitId,
        result: UnitResult,
    },
}

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
