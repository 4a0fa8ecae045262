//! 設備鏈主計算器

use cv_cache::TrainRegistry;
use cv_core::{CvConfig, EquipmentPath, Machine, MachineId, Product, Train};
use std::collections::{BTreeMap, BTreeSet};

use crate::maco::MacoCalculator;
use crate::metrics::TrainMetricsAggregator;
use crate::path::PathNormalizer;
use crate::scoring::RiskScorer;
use crate::{CalcResult, CvWarning};

/// 設備鏈計算器
///
/// 對一份產品/設備快照執行：路徑標準化 → ID調和 → 指標彙總 → RPN → MACO。
pub struct TrainCalculator {
    /// 評分與 MACO 配置
    config: CvConfig,
}

impl TrainCalculator {
    /// 創建新的計算器
    pub fn new(config: CvConfig) -> Self {
        Self { config }
    }

    /// 主計算入口
    pub fn calculate(
        &self,
        products: &[Product],
        machines: &[Machine],
        registry: &mut TrainRegistry,
    ) -> cv_core::Result<CalcResult> {
        tracing::info!(
            "開始設備鏈計算：產品 {} 筆，設備 {} 台",
            products.len(),
            machines.len()
        );

        let start_time = std::time::Instant::now();
        let mut result = CalcResult::empty();
        let normalizer = PathNormalizer::new(machines);

        // Step 1: 設備路徑標準化並按路徑分組
        tracing::debug!("Step 1: 設備路徑標準化");
        let grouped = self.group_products_by_path(products, &normalizer, &mut result);
        tracing::debug!("路徑數量: {}", grouped.len());

        // Step 2: 調和設備鏈ID
        tracing::debug!("Step 2: 設備鏈ID調和");
        result.reconcile = registry.reconcile(grouped.keys().cloned());

        // Step 3: 建立設備鏈並彙總指標
        tracing::debug!("Step 3: 指標彙總");
        let aggregator =
            TrainMetricsAggregator::new(&normalizer, self.config.maco.assumed_swab_area_cm2);
        let mut trains = Vec::with_capacity(grouped.len());

        for (key, (path, members)) in grouped {
            let Some(id) = registry.get(&key) else {
                return Err(cv_core::CvError::CalculationError(format!(
                    "路徑 {} 未取得設備鏈ID",
                    key
                )));
            };

            let machine_ids: BTreeSet<MachineId> = members
                .iter()
                .flat_map(|p| p.machine_ids.iter().copied())
                .collect();

            let lines = normalizer.lines(&machine_ids);
            if lines.len() > 1 {
                tracing::warn!("設備鏈 {} 跨越多條生產線: {:?}", id, lines);
                result.add_warning(CvWarning::warning(
                    format!("train:{}", id),
                    format!("設備跨越多條生產線 {:?}，以最小設備ID的生產線為準", lines),
                ));
            }

            let members: Vec<Product> = members.into_iter().cloned().collect();
            let metrics = aggregator.aggregate(&machine_ids, &members);

            trains.push(Train {
                id,
                path,
                line: normalizer.line_of(&machine_ids),
                machine_ids,
                products: members,
                metrics,
            });
        }
        trains.sort_by_key(|t| t.id);
        tracing::debug!("設備鏈數量: {}", trains.len());

        // Step 4: RPN 評分
        tracing::debug!("Step 4: RPN 評分");
        let scorer = RiskScorer::new(&self.config.scoring);
        for product in products {
            let (rpn_results, warnings) = scorer.score_product(product);
            result.rpn_results.extend(rpn_results);
            result.warnings.extend(warnings);
        }

        // Step 5: MACO 計算
        tracing::debug!("Step 5: MACO 計算");
        let maco_calculator = MacoCalculator::new(&self.config.maco);
        for train in &trains {
            let essa = maco_calculator.essa_for_scope(train, &trains);
            match maco_calculator.calculate(train, essa) {
                Ok(maco) => {
                    for method in &maco.overflowed {
                        tracing::warn!("設備鏈 {} {:?} 運算溢位，不列入最小值", train.id, method);
                        result.add_warning(CvWarning::warning(
                            format!("train:{}", train.id),
                            format!("MACO {:?} 運算溢位，不列入最小值", method),
                        ));
                    }
                    result.maco_results.push(maco);
                }
                Err(e) => {
                    tracing::warn!("設備鏈 {} MACO 計算失敗: {}", train.id, e);
                    result.add_warning(CvWarning::error(
                        format!("train:{}", train.id),
                        format!("MACO 計算失敗: {}", e),
                    ));
                }
            }
        }

        result.trains = trains;
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("設備鏈計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "設備鏈數量: {}，警告: {}",
            result.trains.len(),
            result.warnings.len()
        );

        Ok(result)
    }

    /// 按標準化路徑分組產品
    fn group_products_by_path<'p>(
        &self,
        products: &'p [Product],
        normalizer: &PathNormalizer<'_>,
        result: &mut CalcResult,
    ) -> BTreeMap<String, (EquipmentPath, Vec<&'p Product>)> {
        let mut grouped: BTreeMap<String, (EquipmentPath, Vec<&'p Product>)> = BTreeMap::new();

        for product in products {
            if product.machine_ids.is_empty() {
                tracing::warn!("產品 {} 沒有設備路徑，不納入設備鏈", product.id);
                result.add_warning(CvWarning::warning(
                    product.id.clone(),
                    "沒有設備路徑，不納入設備鏈".to_string(),
                ));
                continue;
            }

            let unknown = normalizer.unknown_machines(&product.machine_ids);
            if !unknown.is_empty() {
                tracing::warn!("產品 {} 引用未登記設備: {:?}", product.id, unknown);
                result.add_warning(CvWarning::warning(
                    product.id.clone(),
                    format!("引用未登記設備 {:?}，表面積以 0 計", unknown),
                ));
            }

            let path = normalizer.normalize(&product.machine_ids);
            grouped
                .entry(path.key())
                .or_insert_with(|| (path, Vec::new()))
                .1
                .push(product);
        }

        grouped
    }

    /// 獲取配置引用
    pub fn config(&self) -> &CvConfig {
        &self.config
    }
}
