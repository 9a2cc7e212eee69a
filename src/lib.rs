//! # PNG Batch Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare della pipeline di compressione batch
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per un eventuale server HTTP
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tassonomia errori del batch (client vs server)
//! - `workspace`: Directory temporanea isolata per batch
//! - `tool_resolver`: Risoluzione dell'eseguibile del compressore
//! - `compressor`: Tentativo di compressione tramite tool esterno
//! - `decision`: Scelta tra originale e output compresso
//! - `validation`: Controlli strutturali sul batch
//! - `stats`: Item caricati, statistiche e riepiloghi
//! - `optimizer`: Orchestratore del batch
//! - `packager`: File singolo o archivio ZIP
//! - `json_output` / `progress`: Reporting per la CLI
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use png_batch_optimizer::{BatchOptimizer, Config, UploadItem};
//!
//! # async fn example(bytes: Vec<u8>) -> anyhow::Result<()> {
//! let optimizer = BatchOptimizer::new(Config::default())?;
//! let payload = optimizer.optimize(vec![UploadItem::new("logo.png", bytes)]).await?;
//! println!("{} -> {}", payload.filename, payload.stats_header()?);
//! # Ok(())
//! # }
//! ```

pub mod compressor;
pub mod config;
pub mod decision;
pub mod error;
pub mod json_output;
pub mod optimizer;
pub mod packager;
pub mod progress;
pub mod stats;
pub mod tool_resolver;
pub mod utils;
pub mod validation;
pub mod workspace;

pub use compressor::{CompressionOutcome, Compressor, ExternalCompressor, FailureReason};
pub use config::Config;
pub use error::BatchError;
pub use optimizer::{BatchOptimizer, BatchResult, OutputShape, ReportMode};
pub use packager::OutputPayload;
pub use stats::{ItemResult, ItemStats, UploadItem};
pub use workspace::Workspace;
