//! 設備鏈ID登記
//!
//! 路徑鍵到設備鏈ID的持久映射。ID 單調遞增、永不重用：
//! 路徑退役後即使相同路徑再次出現，也會取得新的ID。
//! 登記表由呼叫端持有並在每次重算前 `reconcile`，同一實例不可並行調和。

use cv_core::{Result, TrainId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 一次調和的結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// 沿用既有ID的路徑
    pub retained: Vec<(String, TrainId)>,
    /// 新分配ID的路徑
    pub assigned: Vec<(String, TrainId)>,
    /// 已退役的路徑
    pub retired: Vec<(String, TrainId)>,
}

impl ReconcileReport {
    /// 是否與上次完全相同
    pub fn is_unchanged(&self) -> bool {
        self.assigned.is_empty() && self.retired.is_empty()
    }
}

/// 設備鏈ID登記表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainRegistry {
    /// 路徑鍵 → ID
    assignments: BTreeMap<String, TrainId>,

    /// 曾分配過的最大ID
    high_water: TrainId,
}

impl TrainRegistry {
    /// 創建空登記表
    pub fn new() -> Self {
        Self::default()
    }

    /// 由既有映射恢復
    pub fn from_assignments(assignments: BTreeMap<String, TrainId>) -> Self {
        let high_water = assignments.values().copied().max().unwrap_or(0);
        Self {
            assignments,
            high_water,
        }
    }

    /// 查詢路徑的ID
    pub fn get(&self, key: &str) -> Option<TrainId> {
        self.assignments.get(key).copied()
    }

    /// 目前所有映射
    pub fn assignments(&self) -> &BTreeMap<String, TrainId> {
        &self.assignments
    }

    /// 曾分配過的最大ID
    pub fn high_water(&self) -> TrainId {
        self.high_water
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// 以本次計算的路徑鍵調和登記表
    ///
    /// - 新舊皆有的路徑：沿用ID
    /// - 新路徑：依字典序依次分配 `high_water + 1`、`+ 2`……
    /// - 不再出現的路徑：移除，其ID不再分配
    pub fn reconcile<I, S>(&mut self, current_keys: I) -> ReconcileReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let current: BTreeSet<String> = current_keys.into_iter().map(Into::into).collect();
        let mut report = ReconcileReport::default();

        let previous = std::mem::take(&mut self.assignments);
        for (key, id) in previous {
            if current.contains(&key) {
                report.retained.push((key.clone(), id));
                self.assignments.insert(key, id);
            } else {
                report.retired.push((key, id));
            }
        }

        // BTreeSet 迭代即為字典序
        for key in current {
            if self.assignments.contains_key(&key) {
                continue;
            }
            self.high_water += 1;
            let id = self.high_water;
            report.assigned.push((key.clone(), id));
            self.assignments.insert(key, id);
        }

        tracing::debug!(
            "設備鏈ID調和：沿用 {}，新增 {}，退役 {}",
            report.retained.len(),
            report.assigned.len(),
            report.retired.len()
        );

        report
    }

    /// 輸出為 JSON 供持久層保存
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 從 JSON 恢復
    pub fn from_json(json: &str) -> Result<Self> {
        let mut registry: TrainRegistry = serde_json::from_str(json)?;
        let max_assigned = registry.assignments.values().copied().max().unwrap_or(0);
        registry.high_water = registry.high_water.max(max_assigned);
        Ok(registry)
    }
}
