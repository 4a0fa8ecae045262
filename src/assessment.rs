//! 完整評估流程

use chrono::{DateTime, Utc};
use cv_cache::TrainRegistry;
use cv_calc::{CvWarning, TrainCalculator};
use cv_core::{CvConfig, Machine, MacoResult, Product, RpnResult, StudyPlan, Train};
use cv_optimizer::StudyPlanner;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 評估結果（供報表、匯出與問答層讀取）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// 本次評估ID
    pub run_id: Uuid,

    /// 產生時間
    pub generated_at: DateTime<Utc>,

    pub trains: Vec<Train>,
    pub rpn_results: Vec<RpnResult>,
    pub maco_results: Vec<MacoResult>,

    /// 各（生產線, 劑型）分組的研究
    pub study_plans: Vec<StudyPlan>,

    pub warnings: Vec<CvWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: u128,
}

impl AssessmentResult {
    /// 研究總數
    pub fn study_count(&self) -> usize {
        self.study_plans.iter().map(|p| p.studies.len()).sum()
    }

    /// 輸出為 JSON
    pub fn to_json(&self) -> cv_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 評估執行器
pub struct Assessment {
    calculator: TrainCalculator,
}

impl Assessment {
    /// 創建新的評估（配置先行檢查）
    pub fn new(config: CvConfig) -> cv_core::Result<Self> {
        config.validate()?;
        Ok(Self {
            calculator: TrainCalculator::new(config),
        })
    }

    /// 對一份快照執行完整評估
    ///
    /// 登記表由呼叫端持有，評估期間會被調和。
    pub fn run(
        &self,
        products: &[Product],
        machines: &[Machine],
        registry: &mut TrainRegistry,
    ) -> cv_core::Result<AssessmentResult> {
        let start_time = std::time::Instant::now();
        let run_id = Uuid::new_v4();
        tracing::info!("開始評估 {}", run_id);

        let calc = self.calculator.calculate(products, machines, registry)?;
        let study_plans = StudyPlanner::plan(&calc);

        let result = AssessmentResult {
            run_id,
            generated_at: Utc::now(),
            trains: calc.trains,
            rpn_results: calc.rpn_results,
            maco_results: calc.maco_results,
            study_plans,
            warnings: calc.warnings,
            calculation_time_ms: start_time.elapsed().as_millis(),
        };

        tracing::info!(
            "評估 {} 完成：設備鏈 {} 條，研究 {} 項，耗時 {:?}",
            run_id,
            result.trains.len(),
            result.study_count(),
            start_time.elapsed()
        );

        Ok(result)
    }

    /// 獲取配置引用
    pub fn config(&self) -> &CvConfig {
        self.calculator.config()
    }
}
