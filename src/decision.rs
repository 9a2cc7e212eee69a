//! # Decision Policy Module
//!
//! Sceglie tra byte originali e output del compressore.
//!
//! ## Regole:
//! - `Failed` → vince l'originale, riduzione 0.0
//! - `Compressed` → vince il più piccolo in senso STRETTO; a parità vince l'originale
//! - Un output vuoto non vince mai
//! - Percentuale calcolata sempre sulla dimensione originale, arrotondata a due
//!   decimali con round-half-away-from-zero (`f64::round`)
//! - Un risparmio sotto lo 0.005% vince comunque ma riporta 0.0

use crate::compressor::CompressionOutcome;

/// Winner of one item plus derived numbers
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub final_size: u64,
    pub used_compressed: bool,
    pub percent_reduction: f64,
    pub winning_bytes: Vec<u8>,
}

/// Pick the winning byte stream for one item.
///
/// `original` must be non-empty; empty payloads are rejected during validation.
pub fn decide(original: Vec<u8>, outcome: CompressionOutcome) -> Decision {
    let original_size = original.len() as u64;

    match outcome {
        CompressionOutcome::Compressed(output)
            if !output.is_empty() && (output.len() as u64) < original_size =>
        {
            let final_size = output.len() as u64;
            Decision {
                final_size,
                used_compressed: true,
                percent_reduction: percent_reduction(original_size, final_size),
                winning_bytes: output,
            }
        }
        _ => Decision {
            final_size: original_size,
            used_compressed: false,
            percent_reduction: 0.0,
            winning_bytes: original,
        },
    }
}

/// `(original - final) * 100 / original`, rounded to two decimals, half away from zero
pub fn percent_reduction(original_size: u64, final_size: u64) -> f64 {
    if original_size == 0 || final_size >= original_size {
        return 0.0;
    }
    let raw = (original_size - final_size) as f64 * 100.0 / original_size as f64;
    (raw * 100.0).round() / 100.0
}
