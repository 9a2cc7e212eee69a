//! # PNG Batch Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Raccolta dei file di input (file singoli o directory ricorsive)
//! - Creazione della configurazione e avvio della pipeline batch
//! - Scrittura del payload (PNG singolo o `compressed.zip`) e delle statistiche
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging su stderr (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica la configurazione da file (opzionale) e applica gli override CLI
//! 4. Legge i file in memoria come `UploadItem`
//! 5. Esegue il batch e scrive il risultato nella directory di output
//!
//! ## Esempio di utilizzo:
//! ```bash
//! png-optimizer logo.png icons/ --output compressed --quality-min 50 --workers 8
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use png_batch_optimizer::{
    stats::stats_json, tool_resolver::ToolPathResolver, validation::has_extension, BatchOptimizer,
    Config, ReportMode, UploadItem,
};

#[derive(Parser)]
#[command(name = "png-optimizer")]
#[command(about = "Compress a batch of PNG images with an external quantizer")]
struct Args {
    /// PNG files or directories containing PNG files
    #[arg(required_unless_present = "check_tools")]
    inputs: Vec<PathBuf>,

    /// Directory where the compressed image or archive is written
    #[arg(short, long, default_value = "compressed")]
    output: PathBuf,

    /// Load configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lower bound of the quality range (0-100)
    #[arg(long)]
    quality_min: Option<u8>,

    /// Upper bound of the quality range (0-100)
    #[arg(long)]
    quality_max: Option<u8>,

    /// Maximum number of files per batch
    #[arg(long)]
    max_files: Option<usize>,

    /// Compressor timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Number of parallel compressions
    #[arg(short, long)]
    workers: Option<usize>,

    /// Compressor executable (name or path)
    #[arg(long)]
    compressor: Option<PathBuf>,

    /// Write the per-file statistics JSON to this file
    #[arg(long)]
    stats_file: Option<PathBuf>,

    /// Output progress and status as JSON for programmatic use
    #[arg(long)]
    json: bool,

    /// Report whether the compressor can be found and exit
    #[arg(long)]
    check_tools: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging on stderr so stdout stays machine readable
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&args).await?;

    let resolver = ToolPathResolver::new();
    if args.check_tools {
        print!("{}", resolver.get_tools_report(&config.compressor));
        return Ok(());
    }

    if !resolver.is_tool_available(&config.compressor) {
        warn!(
            "Compressor {} not found, every file will keep its original bytes",
            config.compressor.display()
        );
    }

    let files = collect_input_files(&args.inputs, &config.extension())?;
    let items = read_items(&files).await?;

    let report_mode = if args.json {
        ReportMode::Json
    } else {
        ReportMode::ProgressBar
    };
    let optimizer = BatchOptimizer::new(config)?.with_report_mode(report_mode);

    let payload = optimizer
        .optimize(items)
        .await
        .map_err(|e| anyhow::anyhow!("{} (status {})", e, e.status_code()))?;

    tokio::fs::create_dir_all(&args.output)
        .await
        .with_context(|| format!("Failed to create output directory {}", args.output.display()))?;

    // only the final component of the name is trusted as a filename
    let file_name = Path::new(&payload.filename)
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid output filename: {}", payload.filename))?;
    let output_path = args.output.join(file_name);
    tokio::fs::write(&output_path, &payload.body)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    if payload.is_archive() {
        info!(
            "Wrote archive with {} files to {}",
            payload.stats.len(),
            output_path.display()
        );
    } else {
        info!("Wrote {} to {}", payload.filename, output_path.display());
    }

    if let Some(ref stats_path) = args.stats_file {
        let content = serde_json::to_string_pretty(&payload.stats)?;
        tokio::fs::write(stats_path, content)
            .await
            .with_context(|| format!("Failed to write {}", stats_path.display()))?;
    }

    if !args.json {
        println!("{}", stats_json(&payload.stats)?);
    }

    Ok(())
}

/// Configuration from file (or defaults) with CLI overrides applied
async fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::from_file(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(quality_min) = args.quality_min {
        config.quality_min = quality_min;
    }
    if let Some(quality_max) = args.quality_max {
        config.quality_max = quality_max;
    }
    if let Some(max_files) = args.max_files {
        config.max_items = max_files;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(ref compressor) = args.compressor {
        config.compressor = compressor.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Explicit files are kept as given; directories contribute their matching files, sorted
fn collect_input_files(inputs: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|path| has_extension(&path.to_string_lossy(), extension))
                .collect();
            found.sort();
            debug!("Found {} files in {}", found.len(), input.display());
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(anyhow::anyhow!("Input does not exist: {}", input.display()));
        }
    }

    Ok(files)
}

async fn read_items(files: &[PathBuf]) -> Result<Vec<UploadItem>> {
    let mut items = Vec::with_capacity(files.len());
    for path in files {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow::anyhow!("Invalid input path: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        items.push(UploadItem::new(name, bytes));
    }
    Ok(items)
}
