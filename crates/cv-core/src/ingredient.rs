//! 活性成分模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ToxicityPreference;
use crate::score::ToxicitySource;
use crate::serde_ext::lenient_decimal;
use crate::{CvError, Result};

/// 活性成分（隸屬於單一產品）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// 成分名稱
    pub name: String,

    /// 最低治療劑量（mg）
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub therapeutic_dose: Option<Decimal>,

    /// 最大日劑量 MDD（mg）
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub mdd: Option<Decimal>,

    /// 溶解度分類
    #[serde(default)]
    pub solubility: Option<String>,

    /// 易清潔度分類
    #[serde(default)]
    pub cleanability: Option<String>,

    /// 每日允許暴露量 PDE（mg/day）
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub pde: Option<Decimal>,

    /// 半數致死量 LD50（mg/kg）
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub ld50: Option<Decimal>,
}

impl Ingredient {
    /// 創建新的成分（所有數值欄位未提供）
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            therapeutic_dose: None,
            mdd: None,
            solubility: None,
            cleanability: None,
            pde: None,
            ld50: None,
        }
    }

    /// 建構器模式：設置治療劑量
    pub fn with_therapeutic_dose(mut self, dose: Decimal) -> Self {
        self.therapeutic_dose = Some(dose);
        self
    }

    /// 建構器模式：設置最大日劑量
    pub fn with_mdd(mut self, mdd: Decimal) -> Self {
        self.mdd = Some(mdd);
        self
    }

    /// 建構器模式：設置溶解度
    pub fn with_solubility(mut self, solubility: impl Into<String>) -> Self {
        self.solubility = Some(solubility.into());
        self
    }

    /// 建構器模式：設置易清潔度
    pub fn with_cleanability(mut self, cleanability: impl Into<String>) -> Self {
        self.cleanability = Some(cleanability.into());
        self
    }

    /// 建構器模式：設置 PDE
    pub fn with_pde(mut self, pde: Decimal) -> Self {
        self.pde = Some(pde);
        self
    }

    /// 建構器模式：設置 LD50
    pub fn with_ld50(mut self, ld50: Decimal) -> Self {
        self.ld50 = Some(ld50);
        self
    }

    /// 依偏好模式選擇毒性資料來源
    pub fn toxicity_source(&self, preference: ToxicityPreference) -> ToxicitySource {
        ToxicitySource::resolve(self.pde, self.ld50, preference)
    }

    /// 可用於批量/日劑量比的 MDD（必須為正）
    pub fn usable_mdd(&self) -> Option<Decimal> {
        self.mdd.filter(|mdd| *mdd > Decimal::ZERO)
    }

    /// 檢查數值欄位（負值視為資料錯誤）
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("therapeutic_dose", self.therapeutic_dose),
            ("mdd", self.mdd),
            ("pde", self.pde),
            ("ld50", self.ld50),
        ];

        for (field, value) in fields {
            if let Some(v) = value {
                if v < Decimal::ZERO {
                    return Err(CvError::InvalidIngredient(format!(
                        "{}: {} 為負值 ({})",
                        self.name, field, v
                    )));
                }
            }
        }

        Ok(())
    }
}
