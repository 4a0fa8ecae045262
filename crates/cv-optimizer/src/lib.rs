//! # Cleaning Validation Optimizer
//!
//! 驗證研究選擇（貪婪設備覆蓋）

pub mod planner;
pub mod selection;

// Re-export 主要類型
pub use planner::StudyPlanner;
pub use selection::{select_studies, StudyCandidate};
