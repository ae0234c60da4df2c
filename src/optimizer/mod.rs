//! # Optimizer Module
//!
//! Modulo che separa le responsabilità in sottomoduli:
//! - `batch_optimizer`: Orchestratore principale
//! - `task_optimizer`: Invocazione dell'ottimizzatore per singolo file
//! - `worker_pool`: Dispatcher fork-join a concorrenza limitata

pub mod batch_optimizer;
pub mod task_optimizer;
pub mod worker_pool;

pub use batch_optimizer::BatchOptimizer;
pub use task_optimizer::{InvocationResult, TaskOptimizer};
pub use worker_pool::{RunOutcome, WorkerPool};
