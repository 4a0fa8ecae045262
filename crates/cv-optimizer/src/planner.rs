//! 分組研究規劃

use cv_calc::{CalcResult, RiskScorer};
use cv_core::{DosageForm, MachineId, StudyGroupKey, StudyPlan, Train};
use std::collections::{BTreeMap, BTreeSet};

use crate::selection::{select_studies, StudyCandidate};

/// 研究規劃器
///
/// 按（生產線, 劑型）分組，每組獨立執行貪婪覆蓋，研究序號每組從 1 開始。
pub struct StudyPlanner;

impl StudyPlanner {
    /// 為所有分組規劃研究
    pub fn plan(calc: &CalcResult) -> Vec<StudyPlan> {
        let groups = Self::group_trains(&calc.trains);
        tracing::debug!("研究分組數量: {}", groups.len());

        let mut plans = Vec::with_capacity(groups.len());
        for (group, trains) in groups {
            let candidates: Vec<StudyCandidate> = trains
                .iter()
                .filter_map(|train| Self::candidate(calc, train, group.dosage_form))
                .collect();

            let universe: BTreeSet<MachineId> = trains
                .iter()
                .flat_map(|t| t.machine_ids.iter().copied())
                .collect();

            let studies = select_studies(&candidates, &universe);

            tracing::info!(
                "分組 {}：設備鏈 {} 條，設備 {} 台，研究 {} 項",
                group,
                trains.len(),
                universe.len(),
                studies.len()
            );

            plans.push(StudyPlan {
                group,
                studies,
                universe,
            });
        }

        plans
    }

    /// 按（生產線, 劑型）分組設備鏈
    ///
    /// 成員產品劑型不同的設備鏈會同時出現在多個分組。
    pub fn group_trains(trains: &[Train]) -> BTreeMap<StudyGroupKey, Vec<&Train>> {
        let mut groups: BTreeMap<StudyGroupKey, Vec<&Train>> = BTreeMap::new();

        for train in trains {
            for form in train.dosage_forms() {
                groups
                    .entry(StudyGroupKey::new(train.line.clone(), form))
                    .or_default()
                    .push(train);
            }
        }

        groups
    }

    /// 設備鏈在某劑型分組中的最壞情況候選
    ///
    /// 只看該劑型的成員產品；沒有可評分成分時 RPN 為 0，仍參與覆蓋。
    pub fn candidate(calc: &CalcResult, train: &Train, form: DosageForm) -> Option<StudyCandidate> {
        let members: Vec<_> = train
            .products
            .iter()
            .filter(|p| p.product_type == form)
            .collect();
        let first = members.first()?;

        let worst = RiskScorer::worst_case(
            calc.rpn_results
                .iter()
                .filter(|r| members.iter().any(|p| p.id == r.product_id)),
        );

        let candidate = match worst {
            Some(rpn) => {
                let product = members
                    .iter()
                    .find(|p| p.id == rpn.product_id)
                    .unwrap_or(first);
                let mut c = StudyCandidate::new(train.id, rpn.rpn, train.machine_ids.clone())
                    .with_product(product.id.clone(), product.name.clone())
                    .with_ingredient(rpn.ingredient_name.clone());
                if product.is_critical {
                    c = c.with_critical_reason(
                        product.critical_reason.clone().unwrap_or_else(|| "flagged".to_string()),
                    );
                }
                c
            }
            None => StudyCandidate::new(train.id, 0, train.machine_ids.clone())
                .with_product(first.id.clone(), first.name.clone()),
        };

        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_cache::TrainRegistry;
    use cv_calc::TrainCalculator;
    use cv_core::{CvConfig, Ingredient, Machine, Product};
    use rust_decimal::Decimal;

    fn machines() -> Vec<Machine> {
        (1..=6)
            .map(|id| {
                let line = if id <= 5 { "L1" } else { "L2" };
                Machine::new(id, format!("M{}", id), line).with_surface_area(Decimal::from(1000))
            })
            .collect()
    }

    fn product(id: &str, form: DosageForm, machine_ids: Vec<MachineId>, solubility: &str) -> Product {
        Product::new(id, format!("Product {}", id), form)
            .with_batch_size_kg(Decimal::from(100))
            .with_machines(machine_ids)
            .with_ingredient(
                Ingredient::new(format!("{}-API", id))
                    .with_solubility(solubility)
                    .with_therapeutic_dose(Decimal::from(500))
                    .with_cleanability("Easy"),
            )
    }

    #[test]
    fn test_plan_per_line_and_dosage_form() {
        let machines = machines();
        let products = vec![
            product("A", DosageForm::Tablet, vec![1, 2, 3, 4], "Practically insoluble"),
            product("B", DosageForm::Tablet, vec![3, 4, 5], "Very soluble"),
            product("C", DosageForm::Capsule, vec![1, 2], "Soluble"),
            product("D", DosageForm::Tablet, vec![6], "Soluble"),
        ];

        let calculator = TrainCalculator::new(CvConfig::default());
        let mut registry = TrainRegistry::new();
        let calc = calculator
            .calculate(&products, &machines, &mut registry)
            .unwrap();

        let plans = StudyPlanner::plan(&calc);
        assert_eq!(plans.len(), 3);

        let l1_tablet = plans
            .iter()
            .find(|p| p.group == StudyGroupKey::new(Some("L1".to_string()), DosageForm::Tablet))
            .unwrap();
        assert_eq!(l1_tablet.studies.len(), 2);
        assert_eq!(l1_tablet.studies[0].product_id, "A");
        assert_eq!(l1_tablet.studies[1].product_id, "B");
        assert_eq!(l1_tablet.studies[1].new_machines.len(), 1);
        assert!(l1_tablet.is_complete());

        let l1_capsule = plans
            .iter()
            .find(|p| p.group.dosage_form == DosageForm::Capsule)
            .unwrap();
        // 序號每組重新開始
        assert_eq!(l1_capsule.studies[0].study_number, 1);

        let l2 = plans
            .iter()
            .find(|p| p.group.line.as_deref() == Some("L2"))
            .unwrap();
        assert_eq!(l2.studies.len(), 1);
    }

    #[test]
    fn test_mixed_form_train_joins_each_group() {
        let machines = machines();
        let products = vec![
            product("A", DosageForm::Tablet, vec![1, 2], "Soluble"),
            product("B", DosageForm::Liquid, vec![2, 1], "Soluble"),
        ];

        let calculator = TrainCalculator::new(CvConfig::default());
        let mut registry = TrainRegistry::new();
        let calc = calculator
            .calculate(&products, &machines, &mut registry)
            .unwrap();
        assert_eq!(calc.trains.len(), 1);

        let groups = StudyPlanner::group_trains(&calc.trains);
        assert_eq!(groups.len(), 2);

        let liquid = StudyPlanner::candidate(&calc, &calc.trains[0], DosageForm::Liquid).unwrap();
        assert_eq!(liquid.product_id, "B");
        assert!(StudyPlanner::candidate(&calc, &calc.trains[0], DosageForm::Sterile).is_none());
    }

    #[test]
    fn test_train_without_scorable_ingredients_still_covers() {
        let machines = machines();
        let products = vec![Product::new("E", "Empty", DosageForm::Tablet).with_machines(vec![1])];

        let calculator = TrainCalculator::new(CvConfig::default());
        let mut registry = TrainRegistry::new();
        let calc = calculator
            .calculate(&products, &machines, &mut registry)
            .unwrap();

        let plans = StudyPlanner::plan(&calc);
        assert_eq!(plans[0].studies.len(), 1);
        assert_eq!(plans[0].studies[0].rpn, 0);
        assert_eq!(plans[0].studies[0].ingredient_name, None);
    }

    #[test]
    fn test_no_trains_no_plans() {
        assert!(StudyPlanner::plan(&CalcResult::empty()).is_empty());
    }
}
