//! 設備模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::serde_ext::lenient_decimal;

/// 設備ID
pub type MachineId = u32;

/// 共用生產設備
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// 設備ID
    pub id: MachineId,

    /// 設備編號
    #[serde(default)]
    pub number: String,

    /// 設備名稱
    pub name: String,

    /// 製程階段
    #[serde(default)]
    pub stage: String,

    /// 生產線
    pub line: String,

    /// 群組標籤（同群組設備在表面積最壞情況下可互換）
    #[serde(default)]
    pub group: Option<String>,

    /// 接觸表面積（cm²）
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub surface_area_cm2: Option<Decimal>,
}

impl Machine {
    /// 創建新的設備
    pub fn new(id: MachineId, name: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            id,
            number: id.to_string(),
            name: name.into(),
            stage: String::new(),
            line: line.into(),
            group: None,
            surface_area_cm2: None,
        }
    }

    /// 建構器模式：設置製程階段
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    /// 建構器模式：設置群組
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// 建構器模式：設置表面積
    pub fn with_surface_area(mut self, area_cm2: Decimal) -> Self {
        self.surface_area_cm2 = Some(area_cm2);
        self
    }

    /// 表面積，缺值或負值視為 0
    pub fn area(&self) -> Decimal {
        self.surface_area_cm2
            .filter(|a| *a > Decimal::ZERO)
            .unwrap_or(Decimal::ZERO)
    }

    /// 非空白的群組標籤
    pub fn group_tag(&self) -> Option<&str> {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}
