//! # PNG Batch Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test di integrazione
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom e aggregato dei fallimenti
//! - `file_manager`: Discovery dei file in una directory
//! - `tool_resolver`: Ricerca dell'eseguibile dell'ottimizzatore
//! - `progress`: Output sincronizzato su console e statistiche
//! - `optimizer`: Invocazione, worker pool e orchestratore
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use png_batch_optimizer::{BatchOptimizer, Config, ConsoleLogger};
//!
//! let logger = Arc::new(ConsoleLogger::stdout());
//! let optimizer = BatchOptimizer::new(Config::default(), logger)?;
//! optimizer.run(Path::new(".")).await?;
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod optimizer;
pub mod progress;
pub mod tool_resolver;

pub use config::{Config, OptimizerConfig, MAX_PARALLELISM};
pub use error::{FailedTasks, OptimizeError, TaskFailure};
pub use file_manager::{FileManager, FileTask};
pub use optimizer::{BatchOptimizer, InvocationResult, RunOutcome, TaskOptimizer, WorkerPool};
pub use progress::{ConsoleLogger, RunStats, COMPLETION_MESSAGE};
