//! # Cleanval
//!
//! 共用設備清潔驗證風險評估引擎：設備鏈識別、MACO、RPN 與驗證研究選擇

pub mod assessment;

// Re-export 主要類型
pub use assessment::{Assessment, AssessmentResult};
pub use cv_cache::{ReconcileReport, TrainRegistry};
pub use cv_calc::{
    CalcResult, CvWarning, MacoCalculator, PathNormalizer, RiskScorer, TrainCalculator,
    TrainMetricsAggregator, WarningSeverity,
};
pub use cv_core::*;
pub use cv_optimizer::{select_studies, StudyCandidate, StudyPlanner};
