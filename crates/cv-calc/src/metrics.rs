//! 設備鏈指標彙總

use cv_core::{MachineId, Product, TrainMetrics};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::path::PathNormalizer;

const THOUSAND: Decimal = Decimal::ONE_THOUSAND;

/// 設備鏈指標彙總器
pub struct TrainMetricsAggregator<'a> {
    normalizer: &'a PathNormalizer<'a>,
    assumed_ssa: Decimal,
}

impl<'a> TrainMetricsAggregator<'a> {
    pub fn new(normalizer: &'a PathNormalizer<'a>, assumed_ssa: Decimal) -> Self {
        Self {
            normalizer,
            assumed_ssa,
        }
    }

    /// 彙總設備鏈的全部指標
    pub fn aggregate(&self, machine_ids: &BTreeSet<MachineId>, products: &[Product]) -> TrainMetrics {
        let lowest_ltd = Self::lowest_ltd(products);
        let ltd_product_id = lowest_ltd.as_ref().map(|(_, id)| id.as_str());
        let min_ratio = Self::min_bs_mdd_ratio(products, ltd_product_id);

        TrainMetrics {
            essa: self.normalizer.worst_case_area(machine_ids),
            lowest_ltd_product_id: lowest_ltd.as_ref().map(|(_, id)| id.clone()),
            lowest_ltd: lowest_ltd.map(|(dose, _)| dose),
            min_bs_mdd_ratio_product_id: min_ratio.as_ref().map(|(_, id)| id.clone()),
            min_bs_mdd_ratio: min_ratio.map(|(ratio, _)| ratio),
            min_mbs_kg: Self::min_batch_size(products),
            lowest_pde: Self::lowest_pde(products),
            assumed_ssa: self.assumed_ssa,
        }
    }

    /// 所有成員產品所有成分中的最低治療劑量，以及提供它的產品
    pub fn lowest_ltd(products: &[Product]) -> Option<(Decimal, String)> {
        let mut lowest: Option<(Decimal, String)> = None;

        for product in products {
            for dose in product
                .ingredients
                .iter()
                .filter_map(|i| i.therapeutic_dose)
                .filter(|d| *d >= Decimal::ZERO)
            {
                if lowest.as_ref().map_or(true, |(current, _)| dose < *current) {
                    lowest = Some((dose, product.id.clone()));
                }
            }
        }

        lowest
    }

    /// 單一產品的批量/日劑量比
    ///
    /// ratio(p) = min over ingredients of (批量kg × 1000) / (MDD mg / 1000)
    pub fn product_ratio(product: &Product) -> Option<Decimal> {
        let batch_g = product.usable_batch_size()?.checked_mul(THOUSAND)?;

        product
            .ingredients
            .iter()
            .filter_map(|i| i.usable_mdd())
            .filter_map(|mdd| {
                let mdd_g = mdd.checked_div(THOUSAND)?;
                batch_g.checked_div(mdd_g)
            })
            .min()
    }

    /// 最小批量/日劑量比（最壞情況獨立規則）
    ///
    /// 產品依比值遞增排序；若最小比值的產品同時提供了最低治療劑量，
    /// 改取第二小的比值。只有一個產品有比值時無法跳過：
    /// 沒有可用批量或 MDD 的產品不參與排序，即使設備鏈內有多個產品。
    pub fn min_bs_mdd_ratio(
        products: &[Product],
        ltd_product_id: Option<&str>,
    ) -> Option<(Decimal, String)> {
        let mut ratios: Vec<(Decimal, &str)> = products
            .iter()
            .filter_map(|p| Self::product_ratio(p).map(|r| (r, p.id.as_str())))
            .collect();

        // 穩定排序，同比值保留產品原順序
        ratios.sort_by(|a, b| a.0.cmp(&b.0));

        let chosen = match ratios.as_slice() {
            [] => return None,
            [first, second, ..] if Some(first.1) == ltd_product_id => second,
            [first, ..] => first,
        };

        Some((chosen.0, chosen.1.to_string()))
    }

    /// 最小批量（kg）
    pub fn min_batch_size(products: &[Product]) -> Option<Decimal> {
        products.iter().filter_map(Product::usable_batch_size).min()
    }

    /// 所有成分中已提供的最低 PDE
    pub fn lowest_pde(products: &[Product]) -> Option<Decimal> {
        products
            .iter()
            .flat_map(|p| p.ingredients.iter())
            .filter_map(|i| i.pde)
            .filter(|pde| *pde >= Decimal::ZERO)
            .min()
    }
}
