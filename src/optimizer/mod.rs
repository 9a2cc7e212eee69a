//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `batch_optimizer`: Orchestratore principale del batch
//! - `item_optimizer`: Worker per singoli item

pub mod batch_optimizer;
pub mod item_optimizer;

pub use batch_optimizer::{BatchOptimizer, BatchResult, OutputShape, ReportMode};
pub use item_optimizer::ItemOptimizer;
