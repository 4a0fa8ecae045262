//! # Cleaning Validation Calculation Engine
//!
//! 設備路徑標準化、設備鏈指標、RPN 與 MACO 計算

pub mod calculator;
pub mod maco;
pub mod metrics;
pub mod path;
pub mod scoring;

// Re-export 主要類型
pub use calculator::TrainCalculator;
pub use maco::MacoCalculator;
pub use metrics::TrainMetricsAggregator;
pub use path::PathNormalizer;
pub use scoring::RiskScorer;

use cv_cache::ReconcileReport;
use cv_core::{MacoResult, RpnResult, Train, TrainId};
use serde::{Deserialize, Serialize};

/// 設備鏈計算結果
#[derive(Debug, Clone)]
pub struct CalcResult {
    /// 設備鏈（依ID排序）
    pub trains: Vec<Train>,

    /// 各產品成分的 RPN
    pub rpn_results: Vec<RpnResult>,

    /// 各設備鏈的 MACO
    pub maco_results: Vec<MacoResult>,

    /// 本次ID調和結果
    pub reconcile: ReconcileReport,

    /// 警告信息
    pub warnings: Vec<CvWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl CalcResult {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            trains: Vec::new(),
            rpn_results: Vec::new(),
            maco_results: Vec::new(),
            reconcile: ReconcileReport::default(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: CvWarning) {
        self.warnings.push(warning);
    }

    /// 依ID查找設備鏈
    pub fn train(&self, id: TrainId) -> Option<&Train> {
        self.trains.iter().find(|t| t.id == id)
    }

    /// 依設備鏈ID查找 MACO
    pub fn maco(&self, id: TrainId) -> Option<&MacoResult> {
        self.maco_results.iter().find(|m| m.train_id == id)
    }

    /// 某產品的全部 RPN
    pub fn rpn_for_product<'a>(&'a self, product_id: &'a str) -> impl Iterator<Item = &'a RpnResult> {
        self.rpn_results
            .iter()
            .filter(move |r| r.product_id == product_id)
    }
}

/// 計算警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvWarning {
    /// 相關對象（產品ID、設備鏈ID等）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl CvWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }

    pub fn error(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
