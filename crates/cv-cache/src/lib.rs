//! # Cleaning Validation Cache
//!
//! 跨次計算保存的狀態（設備鏈ID登記）

pub mod registry;

// Re-export 主要類型
pub use registry::{ReconcileReport, TrainRegistry};
