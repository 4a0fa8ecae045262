//! 產品模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ingredient::Ingredient;
use crate::machine::MachineId;
use crate::serde_ext::lenient_decimal;

/// 劑型
///
/// 變體順序即途徑風險優先序（無菌 > 半固體 > 錠劑 > 膠囊 > 液體 > 其他），
/// `Ord` 依此順序比較，數值越小風險越高。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DosageForm {
    /// 無菌製劑
    Sterile,
    /// 半固體（軟膏、乳膏）
    Semisolid,
    /// 錠劑
    Tablet,
    /// 膠囊
    Capsule,
    /// 液體
    Liquid,
    /// 其他
    Other,
}

impl DosageForm {
    /// 寬鬆解析目錄層的產品類型字串，無法辨識時為 `Other`
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "sterile" | "injection" | "injectable" | "parenteral" => DosageForm::Sterile,
            "semisolid" | "semi-solid" | "semi solid" | "ointment" | "cream" | "gel" => {
                DosageForm::Semisolid
            }
            "tablet" | "tablets" => DosageForm::Tablet,
            "capsule" | "capsules" => DosageForm::Capsule,
            "liquid" | "liquids" | "syrup" | "solution" | "suspension" => DosageForm::Liquid,
            _ => DosageForm::Other,
        }
    }

    /// 顯示名稱
    pub fn as_str(&self) -> &'static str {
        match self {
            DosageForm::Sterile => "Sterile",
            DosageForm::Semisolid => "Semisolid",
            DosageForm::Tablet => "Tablet",
            DosageForm::Capsule => "Capsule",
            DosageForm::Liquid => "Liquid",
            DosageForm::Other => "Other",
        }
    }

    /// 從多個劑型中選出最壞情況（優先序最前者）
    pub fn worst_case<'a>(forms: impl IntoIterator<Item = &'a DosageForm>) -> Option<DosageForm> {
        forms.into_iter().min().copied()
    }
}

impl From<String> for DosageForm {
    fn from(value: String) -> Self {
        DosageForm::parse(&value)
    }
}

impl From<DosageForm> for String {
    fn from(value: DosageForm) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DosageForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 產品（由目錄編輯器維護，核心只讀）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: String,

    /// 產品代碼
    #[serde(default)]
    pub code: String,

    /// 產品名稱
    pub name: String,

    /// 批量（kg）
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub batch_size_kg: Option<Decimal>,

    /// 劑型
    pub product_type: DosageForm,

    /// 是否為關鍵產品
    #[serde(default)]
    pub is_critical: bool,

    /// 關鍵原因
    #[serde(default)]
    pub critical_reason: Option<String>,

    /// 依序經過的設備
    #[serde(default)]
    pub machine_ids: Vec<MachineId>,

    /// 活性成分
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl Product {
    /// 創建新的產品
    pub fn new(id: impl Into<String>, name: impl Into<String>, product_type: DosageForm) -> Self {
        let id = id.into();
        Self {
            code: id.clone(),
            id,
            name: name.into(),
            batch_size_kg: None,
            product_type,
            is_critical: false,
            critical_reason: None,
            machine_ids: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    /// 建構器模式：設置產品代碼
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// 建構器模式：設置批量
    pub fn with_batch_size_kg(mut self, batch_size_kg: Decimal) -> Self {
        self.batch_size_kg = Some(batch_size_kg);
        self
    }

    /// 建構器模式：標記為關鍵產品
    pub fn with_critical(mut self, reason: impl Into<String>) -> Self {
        self.is_critical = true;
        self.critical_reason = Some(reason.into());
        self
    }

    /// 建構器模式：設置設備路徑
    pub fn with_machines(mut self, machine_ids: Vec<MachineId>) -> Self {
        self.machine_ids = machine_ids;
        self
    }

    /// 建構器模式：添加成分
    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    /// 可用於計算的批量（必須為正）
    pub fn usable_batch_size(&self) -> Option<Decimal> {
        self.batch_size_kg.filter(|bs| *bs > Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Tablet", DosageForm::Tablet)]
    #[case(" capsules ", DosageForm::Capsule)]
    #[case("Semi-Solid", DosageForm::Semisolid)]
    #[case("Injectable", DosageForm::Sterile)]
    #[case("Syrup", DosageForm::Liquid)]
    #[case("Powder", DosageForm::Other)]
    fn test_parse_dosage_form(#[case] input: &str, #[case] expected: DosageForm) {
        assert_eq!(DosageForm::parse(input), expected);
    }

    #[test]
    fn test_worst_case_follows_route_priority() {
        let forms = [DosageForm::Liquid, DosageForm::Tablet, DosageForm::Semisolid];
        assert_eq!(DosageForm::worst_case(&forms), Some(DosageForm::Semisolid));

        let forms = [DosageForm::Other, DosageForm::Capsule];
        assert_eq!(DosageForm::worst_case(&forms), Some(DosageForm::Capsule));

        assert_eq!(DosageForm::worst_case(&[]), None);
    }

    #[test]
    fn test_product_builder() {
        let product = Product::new("P-001", "Paracetamol 500", DosageForm::Tablet)
            .with_code("PCM500")
            .with_batch_size_kg(Decimal::from(120))
            .with_critical("高活性")
            .with_machines(vec![3, 1, 2])
            .with_ingredient(Ingredient::new("Paracetamol"));

        assert_eq!(product.code, "PCM500");
        assert!(product.is_critical);
        assert_eq!(product.machine_ids, vec![3, 1, 2]);
        assert_eq!(product.ingredients.len(), 1);
        assert_eq!(product.usable_batch_size(), Some(Decimal::from(120)));
    }

    #[test]
    fn test_deserialize_product_type_leniently() {
        let json = r#"{
            "id": "P-9",
            "name": "Cream",
            "product_type": "ointment",
            "batch_size_kg": "n/a",
            "machine_ids": [4, 5]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.product_type, DosageForm::Semisolid);
        assert_eq!(product.batch_size_kg, None);
        assert!(product.ingredients.is_empty());
    }
}
