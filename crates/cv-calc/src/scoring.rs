//! 風險優先數（RPN）評分

use cv_core::{Ingredient, Product, Result, RpnResult, ScoringConfig, ToxicitySource};

use crate::CvWarning;

/// RPN 評分器
///
/// 四項分數各自查表後相乘：溶解度 × 劑量 × 易清潔度 × 毒性。
pub struct RiskScorer<'a> {
    config: &'a ScoringConfig,
}

impl<'a> RiskScorer<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// 計算單一成分的 RPN
    pub fn score(&self, product_id: &str, ingredient: &Ingredient) -> Result<RpnResult> {
        ingredient.validate()?;

        let solubility_score = self
            .config
            .solubility
            .lookup(ingredient.solubility.as_deref());
        let dose_score = self.config.dose.lookup(ingredient.therapeutic_dose);
        let cleanability_score = self
            .config
            .cleanability
            .lookup(ingredient.cleanability.as_deref());

        let toxicity_source = ingredient.toxicity_source(self.config.toxicity_preference);
        let toxicity_score = self.toxicity_score(toxicity_source);

        let rpn = solubility_score
            .saturating_mul(dose_score)
            .saturating_mul(cleanability_score)
            .saturating_mul(toxicity_score);

        Ok(RpnResult {
            product_id: product_id.to_string(),
            ingredient_name: ingredient.name.clone(),
            solubility_score,
            dose_score,
            cleanability_score,
            toxicity_score,
            toxicity_source,
            rpn,
            rating: self.config.rate(rpn),
        })
    }

    /// 依毒性來源查表
    pub fn toxicity_score(&self, source: ToxicitySource) -> u32 {
        match source {
            ToxicitySource::Pde(pde) => self.config.pde.lookup(Some(pde)),
            ToxicitySource::Ld50(ld50) => self.config.ld50.lookup(Some(ld50)),
            ToxicitySource::Unavailable => self.config.unavailable_toxicity_score,
        }
    }

    /// 計算產品所有成分的 RPN
    ///
    /// 單一成分出錯時記錄警告並略過，其餘成分照常計算。
    pub fn score_product(&self, product: &Product) -> (Vec<RpnResult>, Vec<CvWarning>) {
        let mut results = Vec::with_capacity(product.ingredients.len());
        let mut warnings = Vec::new();

        for ingredient in &product.ingredients {
            match self.score(&product.id, ingredient) {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!("產品 {} 成分 {} 評分失敗: {}", product.id, ingredient.name, e);
                    warnings.push(CvWarning::warning(
                        product.id.clone(),
                        format!("成分 {} 評分失敗: {}", ingredient.name, e),
                    ));
                }
            }
        }

        (results, warnings)
    }

    /// 最壞情況（RPN 最高；同分取先出現者）
    pub fn worst_case<'r, I>(results: I) -> Option<&'r RpnResult>
    where
        I: IntoIterator<Item = &'r RpnResult>,
    {
        results
            .into_iter()
            .fold(None, |best: Option<&RpnResult>, r| match best {
                Some(b) if b.rpn >= r.rpn => Some(b),
                _ => Some(r),
            })
    }
}
