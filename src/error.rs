//! # Error Types Module
//!
//! Questo modulo definisce la tassonomia degli errori della pipeline batch.
//!
//! ## Responsabilità:
//! - Definisce `BatchError` enum per categorizzare tutti gli errori possibili
//! - Distingue errori strutturali dell'input (client) da errori interni (server)
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `BatchEmpty`: Nessun file ricevuto
//! - `BatchTooLarge`: Troppi file nel batch
//! - `UnsupportedFormat`: Estensione file non accettata
//! - `EmptyPayload`: File con zero byte
//! - `Workspace`: Impossibile creare o rimuovere la directory temporanea
//! - `Packaging`: Costruzione dell'archivio fallita
//!
//! Il fallimento del compressore esterno NON è un errore: viene assorbito come
//! `CompressionOutcome::Failed` e l'item ricade sui byte originali.
//!
//! ## Esempio:
//! ```rust,ignore
//! if items.is_empty() {
//!     return Err(BatchError::BatchEmpty);
//! }
//! ```

/// Errors that abort a whole batch
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("No files received")]
    BatchEmpty,

    #[error("Maximum {max} files allowed, received {count}")]
    BatchTooLarge { count: usize, max: usize },

    #[error("Only {expected} allowed. Invalid file: {filename}")]
    UnsupportedFormat { filename: String, expected: String },

    #[error("Empty file: {0}")]
    EmptyPayload(String),

    #[error("Workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("Packaging error: {0}")]
    Packaging(String),
}

impl BatchError {
    /// Structural input problems the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::BatchEmpty
                | Self::BatchTooLarge { .. }
                | Self::UnsupportedFormat { .. }
                | Self::EmptyPayload(_)
        )
    }

    /// HTTP status an embedding server should answer with
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
