//! # Workspace Management Module
//!
//! Questo modulo gestisce la directory temporanea isolata di ogni batch.
//!
//! ## Responsabilità:
//! - Creazione di una directory unica per batch (token casuale, mai dal nome file)
//! - Sotto-directory per item indicizzate (`item-000`, `item-001`, ...)
//! - Rimozione ricorsiva garantita su ogni percorso di uscita
//! - Utilità per formattazione human-readable delle dimensioni
//!
//! ## Ciclo di vita:
//! - `Workspace::acquire()`: crea la directory prima di processare qualsiasi item
//! - `Workspace::release()`: rimozione esplicita con errore riportato
//! - `Drop`: rimozione automatica su errore, panic o cancellazione del future
//!
//! I nomi dei file caricati dall'utente non raggiungono mai il filesystem:
//! nessuna collisione tra richieste concorrenti e nessun path traversal.
//!
//! ## Esempio:
//! ```rust,ignore
//! let workspace = Workspace::acquire()?;
//! let slot = workspace.item_slot(0).await?;
//! tokio::fs::write(slot.input_path(), &bytes).await?;
//! workspace.release()?;
//! ```

use crate::error::{BatchError, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

const WORKSPACE_PREFIX: &str = "png-batch-";

/// Disposable directory owned by exactly one batch
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace under the system temp directory
    pub fn acquire() -> Result<Self> {
        Self::acquire_in(&std::env::temp_dir())
    }

    /// Create a fresh workspace under `parent`
    pub fn acquire_in(parent: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(parent)
            .map_err(BatchError::Workspace)?;
        debug!("Acquired workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create the private directory of the item at `index`
    pub async fn item_slot(&self, index: usize) -> Result<ItemSlot> {
        let dir = self.dir.path().join(format!("item-{:03}", index));
        tokio::fs::create_dir(&dir).await.map_err(BatchError::Workspace)?;
        Ok(ItemSlot { dir })
    }

    /// Remove the workspace and everything in it
    pub fn release(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => {
                debug!("Released workspace {}", path.display());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to remove workspace {}: {}", path.display(), e);
                Err(BatchError::Workspace(e))
            }
        }
    }
}

/// Per-item directory inside a workspace
#[derive(Debug, Clone)]
pub struct ItemSlot {
    dir: PathBuf,
}

impl ItemSlot {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn input_path(&self) -> PathBuf {
        self.dir.join("input.png")
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join("output.png")
    }
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
