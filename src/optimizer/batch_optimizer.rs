//! # Batch Optimizer Main Orchestrator
//!
//! Orchestratore principale che valida il batch, acquisisce il workspace,
//! delega ogni item a `ItemOptimizer` e sceglie la forma dell'output.
//!
//! ## Flusso:
//! 1. Validazione dell'intero batch (nessun processo esterno prima di questo punto)
//! 2. Acquisizione del workspace isolato
//! 3. Compressione degli item con concorrenza limitata (`workers`),
//!    risultati riportati nell'ordine di upload
//! 4. Rilascio del workspace su ogni percorso di uscita
//! 5. Un item → file singolo; due o più → archivio

use crate::{
    compressor::{Compressor, ExternalCompressor},
    config::Config,
    error::Result,
    json_output::{JsonConfig, JsonMessage},
    optimizer::item_optimizer::ItemOptimizer,
    packager::{package, OutputPayload},
    progress::ProgressManager,
    stats::{BatchSummary, ItemResult, ItemStats, UploadItem},
    validation::validate_batch,
    workspace::Workspace,
};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Forma dell'output di un batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    Single,
    Archive,
}

/// Risultati ordinati di un batch, consumati una volta dal packager
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub items: Vec<ItemResult>,
    pub shape: OutputShape,
}

impl BatchResult {
    pub fn new(items: Vec<ItemResult>) -> Self {
        let shape = if items.len() == 1 {
            OutputShape::Single
        } else {
            OutputShape::Archive
        };
        Self { items, shape }
    }

    /// Statistiche in ordine di upload, indipendenti dalla forma
    pub fn stats(&self) -> Vec<ItemStats> {
        self.items.iter().map(|item| item.stats.clone()).collect()
    }

    pub fn summary(&self) -> BatchSummary {
        Self::summary_of(&self.items)
    }

    fn summary_of(items: &[ItemResult]) -> BatchSummary {
        let stats: Vec<ItemStats> = items.iter().map(|item| item.stats.clone()).collect();
        BatchSummary::from_stats(&stats)
    }
}

/// Come riportare l'avanzamento di un batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Solo logging `tracing`
    #[default]
    Silent,
    /// Progress bar `indicatif`
    ProgressBar,
    /// Eventi JSON su stdout
    Json,
}

/// Orchestratore principale
pub struct BatchOptimizer<C: Compressor = ExternalCompressor> {
    config: Config,
    compressor: C,
    report_mode: ReportMode,
    workspace_root: Option<PathBuf>,
}

impl BatchOptimizer<ExternalCompressor> {
    /// Crea un orchestratore che usa il compressore esterno configurato
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        let compressor = ExternalCompressor::new(&config);
        Ok(Self::with_compressor(config, compressor))
    }
}

impl<C: Compressor> BatchOptimizer<C> {
    /// Crea un orchestratore con un compressore arbitrario
    pub fn with_compressor(config: Config, compressor: C) -> Self {
        Self {
            config,
            compressor,
            report_mode: ReportMode::Silent,
            workspace_root: None,
        }
    }

    pub fn with_report_mode(mut self, report_mode: ReportMode) -> Self {
        self.report_mode = report_mode;
        self
    }

    /// Crea i workspace sotto `root` invece della directory temporanea di sistema
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    /// Pipeline completa: compressione + packaging
    pub async fn optimize(&self, items: Vec<UploadItem>) -> Result<OutputPayload> {
        let result = self.run(items).await?;
        let payload = package(result);
        if let Err(ref e) = payload {
            self.report_error(e);
        }
        payload
    }

    /// Esegue il batch e ritorna i risultati in ordine di upload
    pub async fn run(&self, items: Vec<UploadItem>) -> Result<BatchResult> {
        let start_time = Instant::now();

        if let Err(e) = validate_batch(&items, &self.config) {
            self.report_error(&e);
            return Err(e);
        }

        let workspace = match self.acquire_workspace() {
            Ok(workspace) => workspace,
            Err(e) => {
                self.report_error(&e);
                return Err(e);
            }
        };

        let processed = self.process_items(&workspace, items).await;
        // removal failures are logged by the workspace and never fail the batch
        let _ = workspace.release();

        let result = match processed {
            Ok(results) => BatchResult::new(results),
            Err(e) => {
                self.report_error(&e);
                return Err(e);
            }
        };

        let summary = result.summary();
        info!("{}", summary.format_summary());
        if self.report_mode == ReportMode::Json {
            JsonMessage::complete(summary, start_time.elapsed().as_secs_f64()).emit();
        }

        Ok(result)
    }

    fn acquire_workspace(&self) -> Result<Workspace> {
        match self.workspace_root {
            Some(ref root) => Workspace::acquire_in(root),
            None => Workspace::acquire(),
        }
    }

    /// Processa gli item con concorrenza limitata mantenendo l'ordine di upload
    async fn process_items(&self, workspace: &Workspace, items: Vec<UploadItem>) -> Result<Vec<ItemResult>> {
        let total = items.len();
        info!("Compressing {} files with up to {} workers", total, self.config.workers);

        let progress = match self.report_mode {
            ReportMode::ProgressBar => Some(ProgressManager::new(total as u64)),
            _ => None,
        };
        if self.report_mode == ReportMode::Json {
            JsonMessage::start(total, JsonConfig::from(&self.config)).emit();
        }

        let worker = &ItemOptimizer::new(&self.compressor, workspace);
        let results: Vec<Result<ItemResult>> = stream::iter(items.into_iter().enumerate())
            .map(move |(index, item)| worker.process_item(index, item))
            .buffered(self.config.workers.max(1))
            .enumerate()
            .map(|(index, result)| {
                if let Ok(ref item) = result {
                    self.report_item(index, total, item, progress.as_ref());
                }
                result
            })
            .collect()
            .await;

        let results: Result<Vec<ItemResult>> = results.into_iter().collect();
        if let Some(progress) = progress {
            match results {
                Ok(ref items) => progress.finish(&BatchResult::summary_of(items).format_summary()),
                Err(ref e) => progress.abandon(&e.to_string()),
            }
        }
        results
    }

    fn report_item(&self, index: usize, total: usize, item: &ItemResult, progress: Option<&ProgressManager>) {
        if let Some(progress) = progress {
            let message = if item.stats.used_compressed {
                format!("{}: {:.2}% saved", item.filename(), item.stats.percent_reduction)
            } else {
                format!("{}: kept original", item.filename())
            };
            progress.update(&message);
        }
        if self.report_mode == ReportMode::Json {
            JsonMessage::item_complete(index, total, item.stats.clone()).emit();
        }
    }

    fn report_error(&self, e: &crate::error::BatchError) {
        if e.is_client_error() {
            info!("Batch rejected: {}", e);
        } else {
            error!("Batch failed: {}", e);
        }
        if self.report_mode == ReportMode::Json {
            JsonMessage::error(e).emit();
        }
    }
}
