//! MACO 計算結果模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::DosageForm;
use crate::train::TrainId;

/// MACO 計算方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacoMethod {
    /// 治療劑量法
    DoseBased,
    /// 10 ppm 法
    TenPpm,
    /// 健康基準（PDE）法
    HealthBased,
    /// 目視清潔法
    VisualClean,
}

/// 單一設備鏈的 MACO 計算結果
///
/// `None` 的候選值代表正無窮大，不參與最小值比較。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacoResult {
    /// 設備鏈ID
    pub train_id: TrainId,

    /// 最壞情況劑型
    pub dosage_form: DosageForm,

    /// 採用的安全係數
    pub safety_factor: Decimal,

    /// 治療劑量法（mg）
    pub dose_based: Option<Decimal>,

    /// 10 ppm 法（mg）
    pub ten_ppm: Option<Decimal>,

    /// 健康基準法（mg）
    pub health_based: Option<Decimal>,

    /// 目視清潔法（mg）
    pub visual_clean: Decimal,

    /// 最終 MACO = 四者最小值
    pub final_maco: Decimal,

    /// 決定最終值的方法
    pub governing_method: MacoMethod,

    /// 依範圍選出的 ESSA（cm²）
    pub essa_for_scope: Decimal,

    /// 每單位面積限度（mg/cm²）
    pub maco_per_area: Decimal,

    /// 每支擦拭棒限度（mg/swab）
    pub maco_per_swab: Decimal,

    /// 輸入齊全但運算溢位而被排除的方法
    #[serde(default)]
    pub overflowed: Vec<MacoMethod>,
}

impl MacoResult {
    /// 所有有限候選值
    pub fn candidates(&self) -> Vec<(MacoMethod, Decimal)> {
        [
            (MacoMethod::DoseBased, self.dose_based),
            (MacoMethod::TenPpm, self.ten_ppm),
            (MacoMethod::HealthBased, self.health_based),
            (MacoMethod::VisualClean, Some(self.visual_clean)),
        ]
        .into_iter()
        .filter_map(|(method, value)| value.map(|v| (method, v)))
        .collect()
    }
}
