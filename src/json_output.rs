//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per consumatori programmatici.
//!
//! ## Responsabilità:
//! - Emette messaggi JSON strutturati (una riga per evento) su stdout
//! - Riusa `ItemStats` e `BatchSummary` come payload degli eventi
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del batch
//! - `item_complete`: Fine elaborazione di un item
//! - `complete`: Fine batch con riepilogo
//! - `error`: Batch rifiutato o fallito

use crate::config::Config;
use crate::stats::{BatchSummary, ItemStats};
use serde::{Deserialize, Serialize};

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del batch
    #[serde(rename = "start")]
    Start {
        total_items: usize,
        config: JsonConfig,
    },

    /// Fine elaborazione di un item
    #[serde(rename = "item_complete")]
    ItemComplete {
        index: usize,
        total: usize,
        stats: ItemStats,
    },

    /// Batch completato
    #[serde(rename = "complete")]
    Complete {
        summary: BatchSummary,
        duration_seconds: f64,
    },

    /// Errore generale
    #[serde(rename = "error")]
    Error {
        message: String,
        client_error: bool,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub quality: String,
    pub max_items: usize,
    pub timeout_secs: u64,
    pub workers: usize,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(total_items: usize, config: JsonConfig) -> Self {
        Self::Start { total_items, config }
    }

    pub fn item_complete(index: usize, total: usize, stats: ItemStats) -> Self {
        Self::ItemComplete { index, total, stats }
    }

    pub fn complete(summary: BatchSummary, duration_seconds: f64) -> Self {
        Self::Complete {
            summary,
            duration_seconds,
        }
    }

    pub fn error(error: &crate::error::BatchError) -> Self {
        Self::Error {
            message: error.to_string(),
            client_error: error.is_client_error(),
        }
    }
}

/// Converti Config esistente in JsonConfig
impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            quality: config.quality_range(),
            max_items: config.max_items,
            timeout_secs: config.timeout_secs,
            workers: config.workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BatchError;

    #[test]
    fn test_tagged_messages() {
        let json = serde_json::to_value(JsonMessage::start(2, JsonConfig::from(&Config::default()))).unwrap();
        assert_eq!(json["type"], "start");
        assert_eq!(json["total_items"], 2);
        assert_eq!(json["config"]["quality"], "60-80");

        let json = serde_json::to_value(JsonMessage::error(&BatchError::BatchEmpty)).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "No files received");
        assert_eq!(json["client_error"], true);
    }

    #[test]
    fn test_item_complete_carries_stats() {
        let stats = ItemStats {
            filename: "a.png".to_string(),
            original_size: 10_000,
            final_size: 8_000,
            percent_reduction: 20.0,
            used_compressed: true,
        };
        let json = serde_json::to_value(JsonMessage::item_complete(0, 1, stats)).unwrap();
        assert_eq!(json["type"], "item_complete");
        assert_eq!(json["stats"]["final_size"], 8000);
        assert_eq!(json["stats"]["used_compressed"], true);
    }
}
