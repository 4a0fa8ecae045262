//! 風險評分結果模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ToxicityPreference;

/// 毒性資料來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToxicitySource {
    /// 每日允許暴露量（mg/day）
    Pde(Decimal),
    /// 半數致死量（mg/kg）
    Ld50(Decimal),
    /// 兩者皆無
    Unavailable,
}

impl ToxicitySource {
    /// 依偏好模式決定使用 PDE 或 LD50
    ///
    /// - `Auto` / `ForcePde`：先 PDE，再 LD50
    /// - `ForceLd50`：先 LD50，再 PDE
    pub fn resolve(
        pde: Option<Decimal>,
        ld50: Option<Decimal>,
        preference: ToxicityPreference,
    ) -> Self {
        let pde = pde.map(ToxicitySource::Pde);
        let ld50 = ld50.map(ToxicitySource::Ld50);

        let chosen = match preference {
            ToxicityPreference::Auto | ToxicityPreference::ForcePde => pde.or(ld50),
            ToxicityPreference::ForceLd50 => ld50.or(pde),
        };

        chosen.unwrap_or(ToxicitySource::Unavailable)
    }
}

/// RPN 評級
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpnRating {
    /// 落在某個評級區間
    Rated(String),
    /// 不在任何配置區間內
    Unrated,
}

impl RpnRating {
    pub fn label(&self) -> &str {
        match self {
            RpnRating::Rated(label) => label,
            RpnRating::Unrated => "Unrated",
        }
    }

    pub fn is_rated(&self) -> bool {
        matches!(self, RpnRating::Rated(_))
    }
}

impl fmt::Display for RpnRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 單一成分的風險優先數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpnResult {
    /// 產品ID
    pub product_id: String,

    /// 成分名稱
    pub ingredient_name: String,

    pub solubility_score: u32,
    pub dose_score: u32,
    pub cleanability_score: u32,
    pub toxicity_score: u32,

    /// 毒性分數採用的資料來源
    pub toxicity_source: ToxicitySource,

    /// RPN = 溶解度 × 劑量 × 易清潔度 × 毒性
    pub rpn: u32,

    /// 評級
    pub rating: RpnRating,
}
