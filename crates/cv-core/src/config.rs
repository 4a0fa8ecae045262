//! 評分與 MACO 配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::product::DosageForm;
use crate::score::RpnRating;
use crate::{CvError, Result};

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

/// 毒性資料偏好模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToxicityPreference {
    /// 有 PDE 用 PDE，否則 LD50
    #[default]
    Auto,
    /// 強制優先 PDE
    ForcePde,
    /// 強制優先 LD50
    ForceLd50,
}

/// 數值區間比較運算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RangeOp {
    /// value > min
    GreaterThan { min: Decimal },
    /// value >= min
    GreaterOrEqual { min: Decimal },
    /// value < max
    LessThan { max: Decimal },
    /// value <= max
    LessOrEqual { max: Decimal },
    /// min <= value <= max
    Between { min: Decimal, max: Decimal },
    /// min < value <= max
    AboveUpTo { min: Decimal, max: Decimal },
}

impl RangeOp {
    /// 檢查數值是否落在區間內
    pub fn matches(&self, value: Decimal) -> bool {
        match *self {
            RangeOp::GreaterThan { min } => value > min,
            RangeOp::GreaterOrEqual { min } => value >= min,
            RangeOp::LessThan { max } => value < max,
            RangeOp::LessOrEqual { max } => value <= max,
            RangeOp::Between { min, max } => value >= min && value <= max,
            RangeOp::AboveUpTo { min, max } => value > min && value <= max,
        }
    }
}

/// 區間規則
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRule {
    #[serde(flatten)]
    pub op: RangeOp,
    pub score: u32,
}

/// 區間查表（第一個符合的規則勝出）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTable {
    pub rules: Vec<RangeRule>,
    pub default_score: u32,
}

impl RangeTable {
    /// 創建空表
    pub fn new(default_score: u32) -> Self {
        Self {
            rules: Vec::new(),
            default_score,
        }
    }

    /// 建構器模式：添加規則
    pub fn with_rule(mut self, op: RangeOp, score: u32) -> Self {
        self.rules.push(RangeRule { op, score });
        self
    }

    /// 查找符合的規則分數
    pub fn find(&self, value: Decimal) -> Option<u32> {
        self.rules
            .iter()
            .find(|rule| rule.op.matches(value))
            .map(|rule| rule.score)
    }

    /// 查表，缺值或無符合規則時回傳預設分數
    pub fn lookup(&self, value: Option<Decimal>) -> u32 {
        value
            .and_then(|v| self.find(v))
            .unwrap_or(self.default_score)
    }
}

/// 分類查表（忽略大小寫與前後空白）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub entries: BTreeMap<String, u32>,
    pub default_score: u32,
}

impl CategoryTable {
    /// 創建空表
    pub fn new(default_score: u32) -> Self {
        Self {
            entries: BTreeMap::new(),
            default_score,
        }
    }

    /// 建構器模式：添加分類
    pub fn with_entry(mut self, category: impl Into<String>, score: u32) -> Self {
        self.entries.insert(category.into(), score);
        self
    }

    /// 查找完全符合的分類
    pub fn find(&self, category: &str) -> Option<u32> {
        let wanted = category.trim();
        self.entries
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, score)| *score)
    }

    /// 查表，缺值或無符合分類時回傳預設分數
    pub fn lookup(&self, category: Option<&str>) -> u32 {
        category
            .and_then(|c| self.find(c))
            .unwrap_or(self.default_score)
    }
}

/// RPN 評級區間 [min, max]，max 為 None 表示無上限
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBand {
    pub min: u32,
    pub max: Option<u32>,
    pub label: String,
}

impl RatingBand {
    pub fn new(min: u32, max: Option<u32>, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            label: label.into(),
        }
    }

    pub fn contains(&self, rpn: u32) -> bool {
        rpn >= self.min && self.max.map_or(true, |max| rpn <= max)
    }
}

/// 風險評分配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// 溶解度分數
    pub solubility: CategoryTable,

    /// 治療劑量分數（mg）
    pub dose: RangeTable,

    /// 易清潔度分數
    pub cleanability: CategoryTable,

    /// PDE 毒性分數（mg/day）
    pub pde: RangeTable,

    /// LD50 毒性分數（mg/kg）
    pub ld50: RangeTable,

    /// 無任何毒性資料時的分數
    pub unavailable_toxicity_score: u32,

    /// 評級區間（依序比對）
    pub rating_bands: Vec<RatingBand>,

    /// 毒性資料偏好
    pub toxicity_preference: ToxicityPreference,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            solubility: CategoryTable::new(5)
                .with_entry("Very soluble", 1)
                .with_entry("Freely soluble", 2)
                .with_entry("Soluble", 3)
                .with_entry("Sparingly soluble", 4)
                .with_entry("Slightly soluble", 5)
                .with_entry("Very slightly soluble", 5)
                .with_entry("Practically insoluble", 5),
            dose: RangeTable::new(5)
                .with_rule(RangeOp::LessOrEqual { max: dec(1) }, 5)
                .with_rule(RangeOp::AboveUpTo { min: dec(1), max: dec(10) }, 4)
                .with_rule(RangeOp::AboveUpTo { min: dec(10), max: dec(100) }, 3)
                .with_rule(RangeOp::AboveUpTo { min: dec(100), max: dec(1000) }, 2)
                .with_rule(RangeOp::GreaterThan { min: dec(1000) }, 1),
            cleanability: CategoryTable::new(4)
                .with_entry("Easy", 1)
                .with_entry("Medium", 2)
                .with_entry("Difficult", 3)
                .with_entry("Very difficult", 4),
            pde: RangeTable::new(1)
                .with_rule(RangeOp::LessOrEqual { max: dec(1) }, 10)
                .with_rule(RangeOp::AboveUpTo { min: dec(1), max: dec(10) }, 7)
                .with_rule(RangeOp::AboveUpTo { min: dec(10), max: dec(100) }, 5)
                .with_rule(RangeOp::AboveUpTo { min: dec(100), max: dec(1000) }, 3)
                .with_rule(RangeOp::GreaterThan { min: dec(1000) }, 1),
            ld50: RangeTable::new(1)
                .with_rule(RangeOp::LessOrEqual { max: dec(5) }, 10)
                .with_rule(RangeOp::AboveUpTo { min: dec(5), max: dec(50) }, 7)
                .with_rule(RangeOp::AboveUpTo { min: dec(50), max: dec(500) }, 5)
                .with_rule(RangeOp::AboveUpTo { min: dec(500), max: dec(2000) }, 3)
                .with_rule(RangeOp::GreaterThan { min: dec(2000) }, 1),
            unavailable_toxicity_score: 1,
            rating_bands: vec![
                RatingBand::new(1, Some(20), "Low"),
                RatingBand::new(21, Some(50), "Medium"),
                RatingBand::new(51, None, "High"),
            ],
            toxicity_preference: ToxicityPreference::Auto,
        }
    }
}

impl ScoringConfig {
    /// 建構器模式：設置毒性偏好
    pub fn with_toxicity_preference(mut self, preference: ToxicityPreference) -> Self {
        self.toxicity_preference = preference;
        self
    }

    /// 建構器模式：設置評級區間
    pub fn with_rating_bands(mut self, bands: Vec<RatingBand>) -> Self {
        self.rating_bands = bands;
        self
    }

    /// RPN 評級，不在任何區間內時為 `Unrated`
    pub fn rate(&self, rpn: u32) -> RpnRating {
        self.rating_bands
            .iter()
            .find(|band| band.contains(rpn))
            .map(|band| RpnRating::Rated(band.label.clone()))
            .unwrap_or(RpnRating::Unrated)
    }
}

/// 安全係數區間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyFactorRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl SafetyFactorRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// 保守起見取區間上限
    pub fn factor(&self) -> Decimal {
        self.max
    }
}

/// 目視清潔法使用的 ESSA 範圍
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EssaScope {
    /// 全系統最大 ESSA
    Global,
    /// 同生產線同劑型的最大 ESSA
    #[default]
    LineDosageForm,
}

/// MACO 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacoConfig {
    /// 各劑型安全係數區間
    pub safety_factors: BTreeMap<DosageForm, SafetyFactorRange>,

    /// 目視清潔限度（mg/cm²）
    pub visual_clean_limit: Decimal,

    /// 一般限度（ppm，即 mg/kg）
    pub ppm_limit: Decimal,

    /// 假定擦拭取樣面積（cm²）
    pub assumed_swab_area_cm2: Decimal,

    /// 目視清潔法 ESSA 範圍
    pub essa_scope: EssaScope,
}

impl Default for MacoConfig {
    fn default() -> Self {
        let oral = SafetyFactorRange::new(dec(100), dec(1000));

        let mut safety_factors = BTreeMap::new();
        safety_factors.insert(
            DosageForm::Sterile,
            SafetyFactorRange::new(dec(1000), dec(10000)),
        );
        safety_factors.insert(DosageForm::Semisolid, SafetyFactorRange::new(dec(10), dec(100)));
        safety_factors.insert(DosageForm::Tablet, oral);
        safety_factors.insert(DosageForm::Capsule, oral);
        safety_factors.insert(DosageForm::Liquid, oral);
        safety_factors.insert(DosageForm::Other, oral);

        Self {
            safety_factors,
            visual_clean_limit: Decimal::new(4, 3),
            ppm_limit: dec(10),
            assumed_swab_area_cm2: dec(25),
            essa_scope: EssaScope::default(),
        }
    }
}

impl MacoConfig {
    /// 建構器模式：設置 ESSA 範圍
    pub fn with_essa_scope(mut self, scope: EssaScope) -> Self {
        self.essa_scope = scope;
        self
    }

    /// 建構器模式：設置劑型安全係數
    pub fn with_safety_factor(mut self, form: DosageForm, range: SafetyFactorRange) -> Self {
        self.safety_factors.insert(form, range);
        self
    }

    /// 建構器模式：設置擦拭面積
    pub fn with_assumed_swab_area(mut self, area_cm2: Decimal) -> Self {
        self.assumed_swab_area_cm2 = area_cm2;
        self
    }

    /// 取得劑型的安全係數，未配置時退回 `Other`
    pub fn safety_factor_for(&self, form: DosageForm) -> Option<Decimal> {
        self.safety_factors
            .get(&form)
            .or_else(|| self.safety_factors.get(&DosageForm::Other))
            .map(SafetyFactorRange::factor)
    }
}

/// 清潔驗證總配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CvConfig {
    pub scoring: ScoringConfig,
    pub maco: MacoConfig,
}

impl CvConfig {
    /// 從 JSON 載入配置（未提供的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CvConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 輸出為 JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 建構器模式：設置評分配置
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// 建構器模式：設置 MACO 配置
    pub fn with_maco(mut self, maco: MacoConfig) -> Self {
        self.maco = maco;
        self
    }

    /// 檢查配置一致性
    pub fn validate(&self) -> Result<()> {
        if self.scoring.rating_bands.is_empty() {
            return Err(CvError::InvalidConfig("評級區間不可為空".to_string()));
        }

        for band in &self.scoring.rating_bands {
            if let Some(max) = band.max {
                if max < band.min {
                    return Err(CvError::InvalidConfig(format!(
                        "評級區間 {} 上下限顛倒: {}-{}",
                        band.label, band.min, max
                    )));
                }
            }
        }

        for (form, range) in &self.maco.safety_factors {
            if range.max <= Decimal::ZERO || range.min > range.max {
                return Err(CvError::InvalidConfig(format!(
                    "劑型 {} 的安全係數區間無效: {}-{}",
                    form, range.min, range.max
                )));
            }
        }

        if self.maco.assumed_swab_area_cm2 <= Decimal::ZERO {
            return Err(CvError::InvalidConfig("擦拭面積必須大於 0".to_string()));
        }

        if self.maco.visual_clean_limit < Decimal::ZERO || self.maco.ppm_limit < Decimal::ZERO {
            return Err(CvError::InvalidConfig("限度不可為負值".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RangeOp::GreaterThan { min: Decimal::from(10) }, 10, false)]
    #[case(RangeOp::GreaterOrEqual { min: Decimal::from(10) }, 10, true)]
    #[case(RangeOp::LessThan { max: Decimal::from(10) }, 10, false)]
    #[case(RangeOp::LessOrEqual { max: Decimal::from(10) }, 10, true)]
    #[case(RangeOp::Between { min: Decimal::from(1), max: Decimal::from(10) }, 1, true)]
    #[case(RangeOp::Between { min: Decimal::from(1), max: Decimal::from(10) }, 10, true)]
    #[case(RangeOp::AboveUpTo { min: Decimal::from(1), max: Decimal::from(10) }, 1, false)]
    #[case(RangeOp::AboveUpTo { min: Decimal::from(1), max: Decimal::from(10) }, 10, true)]
    fn test_range_op_boundaries(#[case] op: RangeOp, #[case] value: i64, #[case] expected: bool) {
        assert_eq!(op.matches(Decimal::from(value)), expected);
    }

    #[test]
    fn test_default_dose_bands() {
        let config = ScoringConfig::default();

        assert_eq!(config.dose.lookup(Some(Decimal::new(5, 1))), 5);
        assert_eq!(config.dose.lookup(Some(Decimal::from(100))), 3);
        assert_eq!(config.dose.lookup(Some(Decimal::from(500))), 2);
        assert_eq!(config.dose.lookup(Some(Decimal::from(1000))), 2);
        assert_eq!(config.dose.lookup(Some(Decimal::from(1001))), 1);
        // 缺值使用預設
        assert_eq!(config.dose.lookup(None), 5);
    }

    #[test]
    fn test_category_lookup_is_case_insensitive() {
        let config = ScoringConfig::default();

        assert_eq!(config.solubility.lookup(Some("freely SOLUBLE ")), 2);
        assert_eq!(config.cleanability.lookup(Some("Easy")), 1);
        assert_eq!(config.cleanability.lookup(Some("unknown")), 4);
        assert_eq!(config.cleanability.lookup(None), 4);
    }

    #[rstest]
    #[case(1, "Low")]
    #[case(20, "Low")]
    #[case(21, "Medium")]
    #[case(50, "Medium")]
    #[case(51, "High")]
    #[case(10_000, "High")]
    fn test_default_rating_bands(#[case] rpn: u32, #[case] label: &str) {
        let config = ScoringConfig::default();
        assert_eq!(config.rate(rpn), RpnRating::Rated(label.to_string()));
    }

    #[test]
    fn test_rpn_outside_all_bands_is_unrated() {
        let config = ScoringConfig::default();
        assert_eq!(config.rate(0), RpnRating::Unrated);

        let config = config.with_rating_bands(vec![RatingBand::new(1, Some(10), "Low")]);
        assert_eq!(config.rate(11), RpnRating::Unrated);
    }

    #[test]
    fn test_safety_factor_uses_range_max() {
        let config = MacoConfig::default();

        assert_eq!(
            config.safety_factor_for(DosageForm::Sterile),
            Some(Decimal::from(10000))
        );
        assert_eq!(
            config.safety_factor_for(DosageForm::Tablet),
            Some(Decimal::from(1000))
        );
        assert_eq!(
            config.safety_factor_for(DosageForm::Semisolid),
            Some(Decimal::from(100))
        );
    }

    #[test]
    fn test_safety_factor_falls_back_to_other() {
        let mut config = MacoConfig::default();
        config.safety_factors.remove(&DosageForm::Liquid);

        assert_eq!(
            config.safety_factor_for(DosageForm::Liquid),
            config.safety_factor_for(DosageForm::Other)
        );
    }

    #[test]
    fn test_config_json_round_trip_and_partial_load() {
        let config = CvConfig::default();
        let json = config.to_json().unwrap();
        let parsed = CvConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);

        let partial = r#"{ "maco": { "essa_scope": "Global" } }"#;
        let parsed = CvConfig::from_json(partial).unwrap();
        assert_eq!(parsed.maco.essa_scope, EssaScope::Global);
        assert_eq!(parsed.maco.assumed_swab_area_cm2, Decimal::from(25));
        assert_eq!(parsed.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_validate_rejects_inverted_safety_factor() {
        let config = CvConfig::default().with_maco(MacoConfig::default().with_safety_factor(
            DosageForm::Tablet,
            SafetyFactorRange::new(Decimal::from(1000), Decimal::from(100)),
        ));

        assert!(matches!(config.validate(), Err(CvError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_empty_rating_bands() {
        let config = CvConfig::default()
            .with_scoring(ScoringConfig::default().with_rating_bands(Vec::new()));

        assert!(config.validate().is_err());
    }
}
