//! # PNG Batch Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap` (tutti opzionali)
//! - Inizializzazione del sistema di logging con `tracing` su stderr
//! - Caricamento della configurazione e avvio dell'optimizer
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, config, verbose)
//! 2. Configura il logging (WARN o DEBUG, `RUST_LOG` ha la precedenza)
//! 3. Carica la configurazione (default se non specificata)
//! 4. Istanzia BatchOptimizer e avvia il run sulla directory
//!
//! stdout è riservato alle righe START/END e alla riga di completamento.
//!
//! ## Esempio di utilizzo:
//! ```bash
//! png-optimizer                      # directory corrente, optipng --strip all -o 6
//! png-optimizer ./assets --config optimizer.json --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use png_batch_optimizer::{BatchOptimizer, Config, ConsoleLogger};

#[derive(Parser)]
#[command(name = "png-optimizer")]
#[command(about = "Optimize every PNG in a directory with a bounded pool of optipng processes")]
struct Args {
    /// Directory containing the PNG files (defaults to the current directory)
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// JSON configuration file for the optimizer invocation
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match args.config {
        Some(ref path) => {
            if !path.is_file() {
                return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
            }
            Config::from_file(path).await?
        }
        None => Config::default(),
    };

    let logger = Arc::new(ConsoleLogger::stdout());
    let optimizer = BatchOptimizer::new(config, logger)?;
    optimizer.run(&args.directory).await?;

    Ok(())
}
