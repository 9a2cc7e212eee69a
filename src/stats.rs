//! # Batch Data and Statistics Module
//!
//! Questo modulo definisce i dati che attraversano la pipeline e le statistiche
//! esposte al chiamante.
//!
//! ## Strutture dati:
//! - `UploadItem`: nome file + byte caricati, immutabile
//! - `ItemStats`: statistiche serializzabili di un item (header `X-Compression-Stats`)
//! - `ItemResult`: statistiche + byte vincenti
//! - `BatchSummary`: riepilogo aggregato per logging e CLI
//!
//! ## Formato JSON delle statistiche:
//! ```json
//! [
//!   {
//!     "filename": "logo.png",
//!     "original_size": 10000,
//!     "final_size": 8000,
//!     "percent_reduction": 20.0,
//!     "used_compressed": true
//!   }
//! ]
//! ```

use crate::decision::Decision;
use crate::workspace::format_size;
use serde::{Deserialize, Serialize};

/// One uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadItem {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Per-item statistics reported to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    pub filename: String,
    pub original_size: u64,
    pub final_size: u64,
    pub percent_reduction: f64,
    pub used_compressed: bool,
}

/// Outcome of one item: its statistics and the bytes that won
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResult {
    pub stats: ItemStats,
    pub winning_bytes: Vec<u8>,
}

impl ItemResult {
    pub fn new(filename: String, original_size: u64, decision: Decision) -> Self {
        Self {
            stats: ItemStats {
                filename,
                original_size,
                final_size: decision.final_size,
                percent_reduction: decision.percent_reduction,
                used_compressed: decision.used_compressed,
            },
            winning_bytes: decision.winning_bytes,
        }
    }

    pub fn filename(&self) -> &str {
        &self.stats.filename
    }
}

/// Serialize stats as the compact JSON array sent alongside the payload
pub fn stats_json(stats: &[ItemStats]) -> serde_json::Result<String> {
    serde_json::to_string(stats)
}

/// Aggregated numbers for one batch
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub items: usize,
    pub compressed: usize,
    pub kept_original: usize,
    pub total_original_size: u64,
    pub total_final_size: u64,
}

impl BatchSummary {
    pub fn from_stats(stats: &[ItemStats]) -> Self {
        stats.iter().fold(Self::default(), |mut summary, item| {
            summary.items += 1;
            if item.used_compressed {
                summary.compressed += 1;
            } else {
                summary.kept_original += 1;
            }
            summary.total_original_size += item.original_size;
            summary.total_final_size += item.final_size;
            summary
        })
    }

    pub fn bytes_saved(&self) -> u64 {
        self.total_original_size.saturating_sub(self.total_final_size)
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.bytes_saved() as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Compressed: {} | Kept original: {} | Total saved: {} ({:.2}%)",
            self.items,
            self.compressed,
            self.kept_original,
            format_size(self.bytes_saved()),
            self.overall_reduction_percent()
        )
    }
}
