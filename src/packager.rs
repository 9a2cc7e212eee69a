//! # Packager Module
//!
//! Trasforma un `BatchResult` nel payload finale.
//!
//! ## Forme di output:
//! - **Singolo file**: byte vincenti invariati, nome file originale, `image/png`
//! - **Archivio**: un solo ZIP (`compressed.zip`, `application/zip`, metodo deflate)
//!   con una entry per item, in ordine di upload, nominata col nome originale
//!
//! ## Nomi duplicati:
//! Se due file caricati hanno lo stesso nome, dalla seconda occorrenza in poi
//! l'entry dell'archivio riceve un suffisso ` (2)`, ` (3)`, ... prima
//! dell'estensione. Le statistiche mantengono sempre il nome caricato.

use crate::error::{BatchError, Result};
use crate::optimizer::{BatchResult, OutputShape};
use crate::stats::{stats_json, ItemStats};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const PNG_CONTENT_TYPE: &str = "image/png";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";
pub const ARCHIVE_FILENAME: &str = "compressed.zip";

/// Final response of a batch: body plus the per-item statistics
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPayload {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub stats: Vec<ItemStats>,
}

impl OutputPayload {
    pub fn is_archive(&self) -> bool {
        self.content_type == ZIP_CONTENT_TYPE
    }

    /// Compact stats JSON for an `X-Compression-Stats` style header
    pub fn stats_header(&self) -> Result<String> {
        stats_json(&self.stats).map_err(|e| BatchError::Packaging(e.to_string()))
    }
}

/// Build the output payload for a finished batch
pub fn package(result: BatchResult) -> Result<OutputPayload> {
    let stats = result.stats();

    match result.shape {
        OutputShape::Single => {
            let item = result
                .items
                .into_iter()
                .next()
                .ok_or_else(|| BatchError::Packaging("single-file batch has no item".to_string()))?;
            Ok(OutputPayload {
                filename: item.stats.filename,
                content_type: PNG_CONTENT_TYPE,
                body: item.winning_bytes,
                stats,
            })
        }
        OutputShape::Archive => {
            let body = build_archive(&result)?;
            debug!("Built archive with {} entries ({} bytes)", result.items.len(), body.len());
            Ok(OutputPayload {
                filename: ARCHIVE_FILENAME.to_string(),
                content_type: ZIP_CONTENT_TYPE,
                body,
                stats,
            })
        }
    }
}

fn build_archive(result: &BatchResult) -> Result<Vec<u8>> {
    let names = archive_entry_names(result.items.iter().map(|item| item.filename()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (item, name) in result.items.iter().zip(names) {
        writer
            .start_file(name, options)
            .map_err(|e| BatchError::Packaging(e.to_string()))?;
        writer
            .write_all(&item.winning_bytes)
            .map_err(|e| BatchError::Packaging(e.to_string()))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| BatchError::Packaging(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Entry names in upload order; repeated names get a ` (n)` suffix
pub fn archive_entry_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.to_string();
            let mut counter = 2;
            while !taken.insert(candidate.clone()) {
                candidate = numbered_name(name, counter);
                counter += 1;
            }
            candidate
        })
        .collect()
}

fn numbered_name(name: &str, counter: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, counter, ext),
        _ => format!("{} ({})", name, counter),
    }
}
