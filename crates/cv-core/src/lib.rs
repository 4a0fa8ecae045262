//! # Cleaning Validation Core
//!
//! 核心資料模型與類型定義

pub mod config;
pub mod equipment;
pub mod ingredient;
pub mod machine;
pub mod maco;
pub mod product;
pub mod score;
pub mod serde_ext;
pub mod study;
pub mod train;

// Re-export 主要類型
pub use config::{
    CategoryTable, CvConfig, EssaScope, MacoConfig, RangeOp, RangeRule, RangeTable, RatingBand,
    SafetyFactorRange, ScoringConfig, ToxicityPreference,
};
pub use equipment::{EquipmentPath, PathToken};
pub use ingredient::Ingredient;
pub use machine::{Machine, MachineId};
pub use maco::{MacoMethod, MacoResult};
pub use product::{DosageForm, Product};
pub use score::{RpnRating, RpnResult, ToxicitySource};
pub use study::{Study, StudyGroupKey, StudyPlan};
pub use train::{Train, TrainId, TrainMetrics};

/// 清潔驗證錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum CvError {
    #[error("無效的成分資料: {0}")]
    InvalidIngredient(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("計算錯誤: {0}")]
    CalculationError(String),
}

pub type Result<T> = std::result::Result<T, CvError>;
