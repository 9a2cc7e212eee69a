//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione della pipeline di compressione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` passata esplicitamente all'orchestratore
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `quality_min` / `quality_max`: Range qualità del compressore (default: 60-80)
//! - `max_items`: Numero massimo di file per batch (default: 10)
//! - `timeout_secs`: Timeout per singola invocazione del compressore (default: 120)
//! - `workers`: Numero di compressioni parallele (default: 4)
//! - `compressor`: Eseguibile esterno (default: "pngquant")
//! - `compressor_args`: Argomenti iniziali extra prima del contratto standard
//! - `accepted_extension`: Estensione accettata, case-insensitive (default: "png")
//!
//! Nessuno stato globale: ogni batch riceve la propria `Config`, quindi
//! batch concorrenti con policy diverse non interferiscono.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     quality_min: 50,
//!     workers: 8,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for batch compression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lower bound of the compressor quality range (0-100)
    pub quality_min: u8,
    /// Upper bound of the compressor quality range (0-100)
    pub quality_max: u8,
    /// Maximum number of files accepted in one batch
    pub max_items: usize,
    /// Seconds before a compressor run is abandoned
    pub timeout_secs: u64,
    /// Number of items compressed concurrently
    pub workers: usize,
    /// External compressor executable (name or path)
    pub compressor: PathBuf,
    /// Extra arguments placed before `--quality`
    pub compressor_args: Vec<String>,
    /// Accepted filename extension, without the dot
    pub accepted_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality_min: 60,
            quality_max: 80,
            max_items: 10,
            timeout_secs: 120,
            workers: 4,
            compressor: PathBuf::from("pngquant"),
            compressor_args: Vec::new(),
            accepted_extension: "png".to_string(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality_max > 100 {
            return Err(anyhow::anyhow!("Quality must be between 0 and 100"));
        }

        if self.quality_min > self.quality_max {
            return Err(anyhow::anyhow!(
                "Quality range is inverted: {}-{}",
                self.quality_min,
                self.quality_max
            ));
        }

        if self.max_items == 0 {
            return Err(anyhow::anyhow!("Maximum number of files must be greater than 0"));
        }

        if self.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Compressor timeout must be greater than 0"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if self.compressor.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Compressor executable must not be empty"));
        }

        if self.accepted_extension.trim_start_matches('.').is_empty() {
            return Err(anyhow::anyhow!("Accepted extension must not be empty"));
        }

        Ok(())
    }

    /// Quality argument in the `<min>-<max>` form the compressor expects
    pub fn quality_range(&self) -> String {
        format!("{}-{}", self.quality_min, self.quality_max)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Accepted extension, lowercase and without a leading dot
    pub fn extension(&self) -> String {
        self.accepted_extension.trim_start_matches('.').to_lowercase()
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
