// src/downloader/status.rs

use crate::{
    error::{AppError, AppResult},
    events::UnitId,
};
use log::{debug, warn};
use std::collections::BTreeSet;

/// 当前正在运行的后台单元
#[derive(Debug, Default)]
pub struct ActiveJobRegistry {
    active: BTreeSet<UnitId>,
}

impl ActiveJobRegistry {
    pub fn insert(&mut self, unit: UnitId) -> bool {
        self.active.insert(unit)
    }

    pub fn remove(&mut self, unit: UnitId) -> bool {
        self.active.remove(&unit)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitId> {
        self.active.iter()
    }
}

/// 控制下载目录与主题等设置的锁定状态。
///
/// 只要登记表非空，相关设置就处于锁定状态；登记表清空的那一刻解锁。
/// 只能由控制器修改。
#[derive(Debug, Default)]
pub struct StatusCoordinator {
    registry: ActiveJobRegistry,
}

impl StatusCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit_started(&mut self, unit: UnitId) {
        let was_idle = self.registry.is_empty();
        if !self.registry.insert(unit) {
            warn!("单元 {} 重复登记", unit);
        }
        if was_idle {
            debug!("单元 {} 开始运行，锁定设置", unit);
        }
    }

    /// 返回 true 表示本次移除后已无活动单元，设置随之解锁。
    pub fn unit_finished(&mut self, unit: UnitId) -> bool {
        if !self.registry.remove(unit) {
            warn!("单元 {} 不在活动登记表中", unit);
            return false;
        }
        let idle = self.registry.is_empty();
        if idle {
            debug!("所有单元均已结束，解锁设置");
        }
        idle
    }

    pub fn is_any_job_active(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn controls_enabled(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn ensure_unlocked(&self, what: &'static str) -> AppResult<()> {
        if self.controls_enabled() {
            Ok(())
        } else {
            Err(AppError::ControlsLocked(what))
        }
    }

    pub fn active_units(&self) -> Vec<UnitId> {
        self.registry.iter().copied().collect()
    }
}
