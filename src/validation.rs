//! # Batch Validation Module
//!
//! Controlli strutturali eseguiti sull'intero batch PRIMA di avviare qualsiasi
//! processo esterno.
//!
//! ## Ordine dei controlli:
//! 1. `BatchEmpty`: nessun item
//! 2. `BatchTooLarge`: più di `max_items`
//! 3. Per ogni item, in ordine di upload:
//!    - `UnsupportedFormat`: estensione diversa da quella accettata (case-insensitive)
//!    - `EmptyPayload`: zero byte
//!
//! Il primo errore interrompe l'intero batch: nessun output parziale.

use crate::config::Config;
use crate::error::{BatchError, Result};
use crate::stats::UploadItem;
use std::path::Path;

/// Validate a batch as a whole
pub fn validate_batch(items: &[UploadItem], config: &Config) -> Result<()> {
    if items.is_empty() {
        return Err(BatchError::BatchEmpty);
    }

    if items.len() > config.max_items {
        return Err(BatchError::BatchTooLarge {
            count: items.len(),
            max: config.max_items,
        });
    }

    let extension = config.extension();
    for item in items {
        validate_item(item, &extension)?;
    }

    Ok(())
}

/// Validate one item against the accepted extension (lowercase, no dot)
pub fn validate_item(item: &UploadItem, extension: &str) -> Result<()> {
    if !has_extension(&item.name, extension) {
        return Err(BatchError::UnsupportedFormat {
            filename: item.name.clone(),
            expected: extension.to_uppercase(),
        });
    }

    if item.bytes.is_empty() {
        return Err(BatchError::EmptyPayload(item.name.clone()));
    }

    Ok(())
}

/// Check if a filename carries the extension, ignoring case
pub fn has_extension(filename: &str, extension: &str) -> bool {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
