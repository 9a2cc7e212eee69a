//! # Item Optimizer Module
//!
//! Worker per la compressione di un singolo item.
//! Separato dall'orchestratore principale per maggiore modularità.

use crate::{
    compressor::{CompressionOutcome, Compressor},
    decision::decide,
    error::Result,
    stats::{ItemResult, UploadItem},
    workspace::{format_size, Workspace},
};
use tracing::{debug, info, warn};

/// Worker che comprime un item dentro la propria slot del workspace
pub struct ItemOptimizer<'a, C: Compressor> {
    compressor: &'a C,
    workspace: &'a Workspace,
}

impl<'a, C: Compressor> ItemOptimizer<'a, C> {
    pub fn new(compressor: &'a C, workspace: &'a Workspace) -> Self {
        Self {
            compressor,
            workspace,
        }
    }

    /// Processa un singolo item: tentativo di compressione + decisione.
    ///
    /// Un fallimento del compressore non è un errore; solo problemi del
    /// workspace interrompono il batch.
    pub async fn process_item(&self, index: usize, item: UploadItem) -> Result<ItemResult> {
        let UploadItem { name, bytes } = item;
        let original_size = bytes.len() as u64;
        info!("Compressing: {} ({})", name, format_size(original_size));

        let slot = self.workspace.item_slot(index).await?;
        debug!("Item {} staged in {}", index, slot.dir().display());

        let outcome = self.compressor.attempt(&bytes, &slot).await;
        if let CompressionOutcome::Failed(ref reason) = outcome {
            warn!("Compression failed for {}, keeping original: {}", name, reason);
        }

        let decision = decide(bytes, outcome);
        if decision.used_compressed {
            info!(
                "{}: {} -> {} ({:.2}% saved)",
                name,
                format_size(original_size),
                format_size(decision.final_size),
                decision.percent_reduction
            );
        } else {
            info!("{}: kept original ({})", name, format_size(original_size));
        }

        Ok(ItemResult::new(name, original_size, decision))
    }
}
