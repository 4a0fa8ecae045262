//! 設備鏈（Train）模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::equipment::EquipmentPath;
use crate::machine::MachineId;
use crate::product::{DosageForm, Product};

/// 設備鏈ID
pub type TrainId = u32;

/// 設備鏈彙總指標
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainMetrics {
    /// 設備共用表面積 ESSA（cm²）
    pub essa: Decimal,

    /// 最低治療劑量（mg）
    pub lowest_ltd: Option<Decimal>,

    /// 提供最低治療劑量的產品
    pub lowest_ltd_product_id: Option<String>,

    /// 最小批量/日劑量比
    pub min_bs_mdd_ratio: Option<Decimal>,

    /// 提供最小比值的產品
    pub min_bs_mdd_ratio_product_id: Option<String>,

    /// 最小批量（kg）
    pub min_mbs_kg: Option<Decimal>,

    /// 最低 PDE（mg/day）
    pub lowest_pde: Option<Decimal>,

    /// 假定擦拭取樣面積（cm²）
    pub assumed_ssa: Decimal,
}

/// 共用相同標準化設備路徑的產品集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    /// 穩定的數字ID
    pub id: TrainId,

    /// 標準化路徑
    pub path: EquipmentPath,

    /// 生產線
    pub line: Option<String>,

    /// 成員產品使用的設備聯集
    pub machine_ids: BTreeSet<MachineId>,

    /// 成員產品
    pub products: Vec<Product>,

    /// 彙總指標
    pub metrics: TrainMetrics,
}

impl Train {
    /// 路徑鍵
    pub fn path_key(&self) -> String {
        self.path.key()
    }

    /// 成員產品的劑型
    pub fn dosage_forms(&self) -> BTreeSet<DosageForm> {
        self.products.iter().map(|p| p.product_type).collect()
    }

    /// 最壞情況劑型
    pub fn worst_case_dosage_form(&self) -> DosageForm {
        DosageForm::worst_case(self.products.iter().map(|p| &p.product_type))
            .unwrap_or(DosageForm::Other)
    }

    /// 是否含有指定劑型的產品
    pub fn has_dosage_form(&self, form: DosageForm) -> bool {
        self.products.iter().any(|p| p.product_type == form)
    }

    /// 產品數
    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}
