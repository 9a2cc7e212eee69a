//! # Compression Attempt Module
//!
//! Questo modulo esegue un singolo tentativo di compressione delegandolo
//! interamente a un tool esterno (pngquant o compatibile).
//!
//! ## Contratto del tool esterno
//!
//! ```text
//! <compressor> [compressor_args...] --quality=<min>-<max> --force --output <out> <in>
//! ```
//!
//! - **Successo**: exit code 0 e file di output esistente e non vuoto
//! - **Fallimento**: exit code diverso da 0, spawn fallito, timeout,
//!   output mancante o vuoto
//! - stdout/stderr sono solo diagnostica (log a livello debug), mai interpretati
//!
//! ## Risultato esplicito
//!
//! Il tentativo non propaga MAI errori: ritorna sempre un `CompressionOutcome`.
//! `Failed` è un ramo previsto e testabile, non un'eccezione, e porta con sé
//! il motivo del fallimento per il logging.
//!
//! ## Concorrenza e cancellazione
//!
//! - **tokio::process::Command** con `kill_on_drop(true)`: se il future viene
//!   abbandonato (timeout o client disconnesso) il processo figlio viene terminato
//! - **tokio::time::timeout**: un timeout equivale a un fallimento, nessun output
//!   parziale viene letto
//! - Ogni item usa la propria `ItemSlot`, quindi un processo fallito non tocca
//!   i file degli altri item
//!
//! ## Esempio
//!
//! ```rust,ignore
//! let compressor = ExternalCompressor::new(&config);
//! let slot = workspace.item_slot(0).await?;
//! match compressor.attempt(&bytes, &slot).await {
//!     CompressionOutcome::Compressed(output) => { /* candidate */ }
//!     CompressionOutcome::Failed(reason) => warn!("fallback: {}", reason),
//! }
//! ```

use crate::config::Config;
use crate::tool_resolver::ToolPathResolver;
use crate::utils::to_string_vec;
use crate::workspace::ItemSlot;
use futures::future::{BoxFuture, FutureExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Result of one compression attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionOutcome {
    /// The tool produced a non-empty output
    Compressed(Vec<u8>),
    /// No usable output; the caller keeps the original bytes
    Failed(FailureReason),
}

impl CompressionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Compressed(_))
    }
}

/// Why an attempt did not produce a usable output
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("could not stage input: {0}")]
    StageInput(String),

    #[error("could not start compressor: {0}")]
    Spawn(String),

    #[error("compressor exited with {}", .code.map_or_else(|| "a signal".to_string(), |c| format!("code {}", c)))]
    ExitStatus { code: Option<i32> },

    #[error("compressor timed out after {0:?}")]
    TimedOut(Duration),

    #[error("compressor produced no output file")]
    MissingOutput,

    #[error("compressor produced an empty output file")]
    EmptyOutput,

    #[error("could not read compressor output: {0}")]
    ReadOutput(String),
}

/// A strategy able to attempt compression of one payload inside an item slot
pub trait Compressor: Send + Sync {
    fn attempt<'a>(&'a self, input: &'a [u8], slot: &'a ItemSlot) -> BoxFuture<'a, CompressionOutcome>;
}

/// Compressor backed by an external executable
#[derive(Debug, Clone)]
pub struct ExternalCompressor {
    program: PathBuf,
    leading_args: Vec<String>,
    quality: String,
    timeout: Duration,
}

impl ExternalCompressor {
    /// Build the compressor from configuration, resolving the executable once.
    ///
    /// An unresolvable executable is not an error here: every attempt will then
    /// fail to spawn and fall back to the original bytes.
    pub fn new(config: &Config) -> Self {
        let program = ToolPathResolver::new()
            .resolve_tool(&config.compressor)
            .unwrap_or_else(|| config.compressor.clone());

        Self {
            program,
            leading_args: config.compressor_args.clone(),
            quality: config.quality_range(),
            timeout: config.timeout(),
        }
    }

    /// Override the per-run timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments following the leading ones, in contract order
    fn contract_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let quality = format!("--quality={}", self.quality);
        let mut args = to_string_vec(self.leading_args.iter());
        args.extend(to_string_vec([quality.as_str(), "--force", "--output"]));
        args.push(output.to_string_lossy().into_owned());
        args.push(input.to_string_lossy().into_owned());
        args
    }

    /// Runs the tool and reads back its output.
    async fn run(&self, input: &Path, output: &Path) -> Result<Vec<u8>, FailureReason> {
        let args = self.contract_args(input, output);
        debug!("Running {:?} {:?}", self.program, args);

        let start_time = Instant::now();
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let result = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| FailureReason::TimedOut(self.timeout))?
            .map_err(|e| FailureReason::Spawn(e.to_string()))?;
        let elapsed = start_time.elapsed();

        if !result.stdout.is_empty() {
            debug!("compressor stdout: {}", String::from_utf8_lossy(&result.stdout).trim_end());
        }
        if !result.stderr.is_empty() {
            debug!("compressor stderr: {}", String::from_utf8_lossy(&result.stderr).trim_end());
        }

        if !result.status.success() {
            debug!("{:?} failed after {:?}", self.program, elapsed);
            return Err(FailureReason::ExitStatus {
                code: result.status.code(),
            });
        }
        debug!("{:?} completed successfully in {:?}", self.program, elapsed);

        let bytes = tokio::fs::read(output).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => FailureReason::MissingOutput,
            _ => FailureReason::ReadOutput(e.to_string()),
        })?;

        if bytes.is_empty() {
            return Err(FailureReason::EmptyOutput);
        }
        Ok(bytes)
    }
}

impl Compressor for ExternalCompressor {
    fn attempt<'a>(&'a self, input: &'a [u8], slot: &'a ItemSlot) -> BoxFuture<'a, CompressionOutcome> {
        async move {
            let input_path = slot.input_path();
            if let Err(e) = tokio::fs::write(&input_path, input).await {
                return CompressionOutcome::Failed(FailureReason::StageInput(e.to_string()));
            }

            match self.run(&input_path, &slot.output_path()).await {
                Ok(bytes) => CompressionOutcome::Compressed(bytes),
                Err(reason) => CompressionOutcome::Failed(reason),
            }
        }
        .boxed()
    }
}
