//! 清潔驗證研究模型

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::machine::MachineId;
use crate::product::DosageForm;
use crate::train::TrainId;

/// 研究分組鍵（生產線 + 劑型）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudyGroupKey {
    /// 生產線（無法判定時為 None）
    pub line: Option<String>,

    /// 劑型
    pub dosage_form: DosageForm,
}

impl StudyGroupKey {
    pub fn new(line: Option<String>, dosage_form: DosageForm) -> Self {
        Self { line, dosage_form }
    }
}

impl fmt::Display for StudyGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}",
            self.line.as_deref().unwrap_or("-"),
            self.dosage_form
        )
    }
}

/// 被選中的驗證研究
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    /// 研究記錄ID（每次執行重新產生）
    ///
    /// 跨次計算比對研究請用（分組, `study_number`, `train_id`），選擇結果本身是確定的。
    pub id: Uuid,

    /// 研究序號（每組從 1 開始）
    pub study_number: u32,

    /// 設備鏈ID
    pub train_id: TrainId,

    /// 最壞情況產品
    pub product_id: String,
    pub product_name: String,

    /// 最壞情況成分
    pub ingredient_name: Option<String>,

    /// 最壞情況 RPN
    pub rpn: u32,

    /// 設備鏈的完整設備集合
    pub machines: BTreeSet<MachineId>,

    /// 本研究新覆蓋的設備
    pub new_machines: BTreeSet<MachineId>,

    /// 選擇理由
    pub justification: String,
}

/// 單一分組的研究計劃
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub group: StudyGroupKey,

    /// 依序選出的研究
    pub studies: Vec<Study>,

    /// 分組設備全集
    pub universe: BTreeSet<MachineId>,
}

impl StudyPlan {
    /// 所有研究新覆蓋設備的聯集
    pub fn covered_machines(&self) -> BTreeSet<MachineId> {
        self.studies
            .iter()
            .flat_map(|s| s.new_machines.iter().copied())
            .collect()
    }

    /// 是否完整覆蓋分組內所有設備
    pub fn is_complete(&self) -> bool {
        self.covered_machines() == self.universe
    }
}
