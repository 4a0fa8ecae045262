//! 貪婪設備覆蓋選擇
//!
//! 依 RPN 由高到低逐一檢查設備鏈，只要能覆蓋尚未覆蓋的設備就選為研究。
//! 這是近似演算法，不保證研究數最少。

use cv_core::{MachineId, Study, TrainId};
use std::collections::BTreeSet;
use uuid::Uuid;

/// 研究候選（單一設備鏈在某分組內的最壞情況）
#[derive(Debug, Clone, PartialEq)]
pub struct StudyCandidate {
    pub train_id: TrainId,

    /// 最壞情況 RPN
    pub rpn: u32,

    pub product_id: String,
    pub product_name: String,
    pub ingredient_name: Option<String>,

    /// 最壞情況產品的關鍵原因（非關鍵產品為 None）
    pub critical_reason: Option<String>,

    /// 設備鏈的設備集合
    pub machines: BTreeSet<MachineId>,
}

impl StudyCandidate {
    pub fn new(train_id: TrainId, rpn: u32, machines: BTreeSet<MachineId>) -> Self {
        Self {
            train_id,
            rpn,
            product_id: String::new(),
            product_name: String::new(),
            ingredient_name: None,
            critical_reason: None,
            machines,
        }
    }

    /// 建構器模式：設置最壞情況產品
    pub fn with_product(mut self, product_id: impl Into<String>, product_name: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self.product_name = product_name.into();
        self
    }

    /// 建構器模式：設置最壞情況成分
    pub fn with_ingredient(mut self, ingredient_name: impl Into<String>) -> Self {
        self.ingredient_name = Some(ingredient_name.into());
        self
    }

    /// 建構器模式：設置關鍵原因
    pub fn with_critical_reason(mut self, reason: impl Into<String>) -> Self {
        self.critical_reason = Some(reason.into());
        self
    }
}

/// 選出覆蓋設備全集的有序研究
///
/// 排序：RPN 遞減，同 RPN 依設備鏈ID遞增。
/// 未帶來新設備的設備鏈不產生研究；全集被覆蓋後提前結束。
pub fn select_studies(
    candidates: &[StudyCandidate],
    universe: &BTreeSet<MachineId>,
) -> Vec<Study> {
    let mut ordered: Vec<&StudyCandidate> = candidates.iter().collect();
    ordered.sort_by(|a, b| b.rpn.cmp(&a.rpn).then(a.train_id.cmp(&b.train_id)));

    let mut covered: BTreeSet<MachineId> = BTreeSet::new();
    let mut studies = Vec::new();
    let mut study_number = 0;

    for candidate in ordered {
        let new_machines: BTreeSet<MachineId> =
            candidate.machines.difference(&covered).copied().collect();

        if new_machines.is_empty() {
            tracing::debug!("設備鏈 {} 無新設備，略過", candidate.train_id);
            continue;
        }

        study_number += 1;
        covered.extend(new_machines.iter().copied());

        studies.push(Study {
            id: Uuid::new_v4(),
            study_number,
            train_id: candidate.train_id,
            product_id: candidate.product_id.clone(),
            product_name: candidate.product_name.clone(),
            ingredient_name: candidate.ingredient_name.clone(),
            rpn: candidate.rpn,
            machines: candidate.machines.clone(),
            justification: justification(candidate, &new_machines),
            new_machines,
        });

        if !universe.is_empty() && universe.is_subset(&covered) {
            tracing::debug!("全部設備已覆蓋，共 {} 項研究", study_number);
            break;
        }
    }

    studies
}

fn justification(candidate: &StudyCandidate, new_machines: &BTreeSet<MachineId>) -> String {
    let machines = new_machines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut text = format!(
        "Covers uncovered machines [{}]; worst-case RPN {}",
        machines, candidate.rpn
    );
    if let Some(ingredient) = &candidate.ingredient_name {
        text.push_str(&format!(" ({})", ingredient));
    }
    if let Some(reason) = &candidate.critical_reason {
        text.push_str(&format!("; critical product: {}", reason));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[MachineId]) -> BTreeSet<MachineId> {
        ids.iter().copied().collect()
    }

    fn candidate(train_id: TrainId, rpn: u32, machines: &[MachineId]) -> StudyCandidate {
        StudyCandidate::new(train_id, rpn, set(machines))
            .with_product(format!("P-{}", train_id), format!("Product {}", train_id))
    }

    #[test]
    fn test_overlapping_trains() {
        let candidates = vec![candidate(2, 20, &[3, 4, 5]), candidate(1, 60, &[1, 2, 3, 4])];
        let universe = set(&[1, 2, 3, 4, 5]);

        let studies = select_studies(&candidates, &universe);

        assert_eq!(studies.len(), 2);
        assert_eq!(studies[0].study_number, 1);
        assert_eq!(studies[0].train_id, 1);
        assert_eq!(studies[0].new_machines, set(&[1, 2, 3, 4]));
        assert_eq!(studies[1].study_number, 2);
        assert_eq!(studies[1].train_id, 2);
        assert_eq!(studies[1].machines, set(&[3, 4, 5]));
        assert_eq!(studies[1].new_machines, set(&[5]));
    }

    #[test]
    fn test_subset_train_is_skipped() {
        let candidates = vec![candidate(1, 60, &[1, 2, 3, 4]), candidate(2, 20, &[2, 3])];
        let universe = set(&[1, 2, 3, 4]);

        let studies = select_studies(&candidates, &universe);

        assert_eq!(studies.len(), 1);
        assert_eq!(studies[0].train_id, 1);
    }

    #[test]
    fn test_equal_rpn_breaks_ties_by_train_id() {
        let candidates = vec![candidate(5, 30, &[1, 2]), candidate(3, 30, &[2, 3])];
        let universe = set(&[1, 2, 3]);

        let studies = select_studies(&candidates, &universe);

        assert_eq!(studies[0].train_id, 3);
        assert_eq!(studies[1].train_id, 5);
        assert_eq!(studies[1].new_machines, set(&[1]));
    }

    #[test]
    fn test_stops_once_universe_is_covered() {
        let candidates = vec![
            candidate(1, 90, &[1, 2]),
            candidate(2, 80, &[3]),
            candidate(3, 10, &[4]),
        ];
        // 全集只含 1..=3，設備鏈 3 不再被考慮
        let universe = set(&[1, 2, 3]);

        let studies = select_studies(&candidates, &universe);
        assert_eq!(studies.len(), 2);
    }

    #[test]
    fn test_rerun_selects_same_studies_with_fresh_ids() {
        let candidates = vec![candidate(1, 60, &[1, 2]), candidate(2, 40, &[2, 3])];
        let universe = set(&[1, 2, 3]);

        let first = select_studies(&candidates, &universe);
        let second = select_studies(&candidates, &universe);

        let key = |s: &Study| (s.study_number, s.train_id, s.new_machines.clone());
        assert_eq!(
            first.iter().map(key).collect::<Vec<_>>(),
            second.iter().map(key).collect::<Vec<_>>()
        );
        assert_ne!(first[0].id, second[0].id);
        assert_ne!(first[0].id, first[1].id);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(select_studies(&[], &BTreeSet::new()).is_empty());

        let candidates = vec![candidate(1, 10, &[])];
        assert!(select_studies(&candidates, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_justification_mentions_critical_product() {
        let candidates = vec![candidate(1, 60, &[7, 8])
            .with_ingredient("API-X")
            .with_critical_reason("cytotoxic")];

        let studies = select_studies(&candidates, &set(&[7, 8]));

        assert_eq!(
            studies[0].justification,
            "Covers uncovered machines [7, 8]; worst-case RPN 60 (API-X); critical product: cytotoxic"
        );
    }
}
