//! MACO（最大允許殘留量）計算

use cv_core::{
    CvError, DosageForm, EssaScope, MacoConfig, MacoMethod, MacoResult, Result, Train,
};
use rust_decimal::Decimal;

/// MACO 計算器
///
/// 四種方法分別計算，最終值取最小者。缺少輸入的方法視為正無窮大。
pub struct MacoCalculator<'a> {
    config: &'a MacoConfig,
}

impl<'a> MacoCalculator<'a> {
    pub fn new(config: &'a MacoConfig) -> Self {
        Self { config }
    }

    /// 設備鏈的最壞情況劑型與安全係數
    pub fn safety_factor(&self, train: &Train) -> Result<(DosageForm, Decimal)> {
        let form = train.worst_case_dosage_form();
        let factor = self
            .config
            .safety_factor_for(form)
            .filter(|sf| *sf > Decimal::ZERO)
            .ok_or_else(|| {
                CvError::CalculationError(format!("劑型 {} 沒有可用的安全係數", form))
            })?;

        Ok((form, factor))
    }

    /// 依配置範圍選出目視清潔法使用的 ESSA
    pub fn essa_for_scope(&self, train: &Train, all_trains: &[Train]) -> Decimal {
        let scope_max = match self.config.essa_scope {
            EssaScope::Global => all_trains.iter().map(|t| t.metrics.essa).max(),
            EssaScope::LineDosageForm => {
                let form = train.worst_case_dosage_form();
                all_trains
                    .iter()
                    .filter(|t| t.line == train.line && t.has_dosage_form(form))
                    .map(|t| t.metrics.essa)
                    .max()
            }
        };

        scope_max
            .unwrap_or(Decimal::ZERO)
            .max(train.metrics.essa)
    }

    /// 計算單一設備鏈的 MACO
    pub fn calculate(&self, train: &Train, essa_for_scope: Decimal) -> Result<MacoResult> {
        let (dosage_form, safety_factor) = self.safety_factor(train)?;
        let metrics = &train.metrics;

        let mut overflowed = Vec::new();

        let dose_based = match (metrics.lowest_ltd, metrics.min_bs_mdd_ratio) {
            (Some(ltd), Some(ratio)) => Self::track_overflow(
                MacoMethod::DoseBased,
                ltd.checked_mul(ratio)
                    .and_then(|v| v.checked_div(safety_factor)),
                &mut overflowed,
            ),
            _ => None,
        };

        let ten_ppm = match metrics.min_mbs_kg {
            Some(mbs) => Self::track_overflow(
                MacoMethod::TenPpm,
                self.config.ppm_limit.checked_mul(mbs),
                &mut overflowed,
            ),
            None => None,
        };

        let health_based = match (metrics.lowest_pde, metrics.min_bs_mdd_ratio) {
            (Some(pde), Some(ratio)) => Self::track_overflow(
                MacoMethod::HealthBased,
                pde.checked_mul(ratio),
                &mut overflowed,
            ),
            _ => None,
        };

        let visual_clean = self
            .config
            .visual_clean_limit
            .checked_mul(essa_for_scope)
            .ok_or_else(|| {
                CvError::CalculationError(format!("設備鏈 {} 目視清潔限度溢位", train.id))
            })?;

        let (governing_method, final_maco) = [
            (MacoMethod::DoseBased, dose_based),
            (MacoMethod::TenPpm, ten_ppm),
            (MacoMethod::HealthBased, health_based),
        ]
        .into_iter()
        .filter_map(|(method, value)| value.map(|v| (method, v)))
        .fold(
            (MacoMethod::VisualClean, visual_clean),
            |best, candidate| if candidate.1 < best.1 { candidate } else { best },
        );

        let maco_per_area = if essa_for_scope > Decimal::ZERO {
            final_maco / essa_for_scope
        } else {
            Decimal::ZERO
        };
        let maco_per_swab = maco_per_area * metrics.assumed_ssa;

        tracing::debug!(
            "設備鏈 {} MACO: {} ({:?})，安全係數 {}",
            train.id,
            final_maco,
            governing_method,
            safety_factor
        );

        Ok(MacoResult {
            train_id: train.id,
            dosage_form,
            safety_factor,
            dose_based,
            ten_ppm,
            health_based,
            visual_clean,
            final_maco,
            governing_method,
            essa_for_scope,
            maco_per_area,
            maco_per_swab,
            overflowed,
        })
    }

    /// 輸入齊全但結果為 None 代表溢位，記下方法
    fn track_overflow(
        method: MacoMethod,
        value: Option<Decimal>,
        overflowed: &mut Vec<MacoMethod>,
    ) -> Option<Decimal> {
        if value.is_none() {
            overflowed.push(method);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::{EquipmentPath, Product, TrainMetrics};
    use std::collections::BTreeSet;

    fn train(id: u32, line: &str, form: DosageForm, metrics: TrainMetrics) -> Train {
        Train {
            id,
            path: EquipmentPath::from_tokens(Vec::new()),
            line: Some(line.to_string()),
            machine_ids: BTreeSet::new(),
            products: vec![Product::new(format!("P-{}", id), "product", form)],
            metrics,
        }
    }

    fn metrics(essa: i64) -> TrainMetrics {
        TrainMetrics {
            essa: Decimal::from(essa),
            lowest_ltd: Some(Decimal::from(10)),
            lowest_ltd_product_id: None,
            min_bs_mdd_ratio: Some(Decimal::from(50000)),
            min_bs_mdd_ratio_product_id: None,
            min_mbs_kg: Some(Decimal::from(100)),
            lowest_pde: None,
            assumed_ssa: Decimal::from(25),
        }
    }

    #[test]
    fn test_four_methods_and_minimum_rule() {
        let config = MacoConfig::default();
        let calculator = MacoCalculator::new(&config);
        let t = train(1, "L1", DosageForm::Tablet, metrics(100_000));

        let result = calculator.calculate(&t, Decimal::from(100_000)).unwrap();

        // 10 × 50000 / 1000
        assert_eq!(result.dose_based, Some(Decimal::from(500)));
        // 10 × 100
        assert_eq!(result.ten_ppm, Some(Decimal::from(1000)));
        assert_eq!(result.health_based, None);
        // 0.004 × 100000
        assert_eq!(result.visual_clean, Decimal::from(400));
        assert_eq!(result.final_maco, Decimal::from(400));
        assert_eq!(result.governing_method, MacoMethod::VisualClean);
        assert_eq!(result.maco_per_area, Decimal::new(4, 3));
        assert_eq!(result.maco_per_swab, Decimal::new(1, 1));
    }

    #[test]
    fn test_health_based_when_pde_declared() {
        let config = MacoConfig::default();
        let calculator = MacoCalculator::new(&config);
        let mut m = metrics(1_000_000);
        m.lowest_pde = Some(Decimal::new(1, 3));
        let t = train(1, "L1", DosageForm::Tablet, m);

        let result = calculator.calculate(&t, Decimal::from(1_000_000)).unwrap();

        // 0.001 × 50000
        assert_eq!(result.health_based, Some(Decimal::from(50)));
        assert_eq!(result.final_maco, Decimal::from(50));
        assert_eq!(result.governing_method, MacoMethod::HealthBased);
        for (_, value) in result.candidates() {
            assert!(result.final_maco <= value);
        }
    }

    #[test]
    fn test_sterile_uses_highest_safety_factor() {
        let config = MacoConfig::default();
        let calculator = MacoCalculator::new(&config);
        let mut t = train(1, "L1", DosageForm::Tablet, metrics(1_000_000));
        t.products
            .push(Product::new("P-S", "injection", DosageForm::Sterile));

        let (form, sf) = calculator.safety_factor(&t).unwrap();
        assert_eq!(form, DosageForm::Sterile);
        assert_eq!(sf, Decimal::from(10000));

        let result = calculator.calculate(&t, Decimal::from(1_000_000)).unwrap();
        assert_eq!(result.dose_based, Some(Decimal::from(50)));
    }

    #[test]
    fn test_overflowing_methods_are_reported() {
        let config = MacoConfig::default();
        let calculator = MacoCalculator::new(&config);
        let mut m = metrics(1000);
        m.lowest_ltd = Some(Decimal::MAX);
        m.min_bs_mdd_ratio = Some(Decimal::MAX);
        m.min_mbs_kg = Some(Decimal::MAX);
        m.lowest_pde = Some(Decimal::MAX);
        let t = train(1, "L1", DosageForm::Tablet, m);

        let result = calculator.calculate(&t, Decimal::from(1000)).unwrap();

        assert_eq!(result.dose_based, None);
        assert_eq!(result.ten_ppm, None);
        assert_eq!(result.health_based, None);
        assert_eq!(
            result.overflowed,
            vec![MacoMethod::DoseBased, MacoMethod::TenPpm, MacoMethod::HealthBased]
        );
        assert_eq!(result.governing_method, MacoMethod::VisualClean);
    }

    #[test]
    fn test_missing_inputs_are_not_overflow() {
        let config = MacoConfig::default();
        let calculator = MacoCalculator::new(&config);
        // lowest_pde 為 None：健康基準法缺輸入而非溢位
        let t = train(1, "L1", DosageForm::Tablet, metrics(1000));

        let result = calculator.calculate(&t, Decimal::from(1000)).unwrap();
        assert!(result.overflowed.is_empty());
    }

    #[test]
    fn test_zero_essa_gives_zero_per_area() {
        let config = MacoConfig::default();
        let calculator = MacoCalculator::new(&config);
        let t = train(1, "L1", DosageForm::Tablet, metrics(0));

        let result = calculator.calculate(&t, Decimal::ZERO).unwrap();
        assert_eq!(result.visual_clean, Decimal::ZERO);
        assert_eq!(result.final_maco, Decimal::ZERO);
        assert_eq!(result.maco_per_area, Decimal::ZERO);
        assert_eq!(result.maco_per_swab, Decimal::ZERO);
    }

    #[test]
    fn test_missing_safety_factor_is_an_error() {
        let mut config = MacoConfig::default();
        config.safety_factors.clear();
        let calculator = MacoCalculator::new(&config);
        let t = train(1, "L1", DosageForm::Tablet, metrics(10));

        assert!(matches!(
            calculator.calculate(&t, Decimal::from(10)),
            Err(CvError::CalculationError(_))
        ));
    }

    #[test]
    fn test_essa_scope_selection() {
        let trains = vec![
            train(1, "L1", DosageForm::Tablet, metrics(1000)),
            train(2, "L1", DosageForm::Tablet, metrics(3000)),
            train(3, "L1", DosageForm::Capsule, metrics(9000)),
            train(4, "L2", DosageForm::Tablet, metrics(7000)),
        ];

        let config = MacoConfig::default();
        let calculator = MacoCalculator::new(&config);
        assert_eq!(
            calculator.essa_for_scope(&trains[0], &trains),
            Decimal::from(3000)
        );

        let config = MacoConfig::default().with_essa_scope(EssaScope::Global);
        let calculator = MacoCalculator::new(&config);
        assert_eq!(
            calculator.essa_for_scope(&trains[0], &trains),
            Decimal::from(9000)
        );
    }
}
