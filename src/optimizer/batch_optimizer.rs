//! # Batch Optimizer Main Orchestrator
//!
//! Orchestratore del run: discovery → dispatch sul worker pool → riepilogo.
//!
//! ## Flusso:
//! 1. Trova i file nella directory (errore fatale se non leggibile)
//! 2. Controlla che l'ottimizzatore sia raggiungibile (solo diagnostica)
//! 3. Esegue START → ottimizzatore → END per ogni file, max `MAX_PARALLELISM` alla volta
//! 4. Dopo il drain: errore aggregato se qualche task è fallito,
//!    altrimenti stampa la riga di completamento

use crate::{
    config::{Config, MAX_PARALLELISM},
    error::OptimizeError,
    file_manager::{FileManager, FileTask},
    optimizer::{
        task_optimizer::{InvocationResult, TaskOptimizer},
        worker_pool::WorkerPool,
    },
    progress::{ConsoleLogger, RunStats},
    tool_resolver::ToolPathResolver,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Orchestratore principale
pub struct BatchOptimizer<W: Write + Send + 'static> {
    config: Config,
    logger: Arc<ConsoleLogger<W>>,
    tool_resolver: ToolPathResolver,
}

impl<W: Write + Send + 'static> BatchOptimizer<W> {
    /// Crea nuova istanza dell'ottimizzatore
    pub fn new(config: Config, logger: Arc<ConsoleLogger<W>>) -> Result<Self, OptimizeError> {
        config.validate()?;

        Ok(Self {
            config,
            logger,
            tool_resolver: ToolPathResolver::new(),
        })
    }

    /// Esegue il processo di ottimizzazione
    pub async fn run(&self, dir: &Path) -> Result<RunStats, OptimizeError> {
        let start_time = std::time::Instant::now();

        let tasks = FileManager::find_files(dir, self.config.normalized_extension())?;
        info!(
            "Found {} .{} files to optimize in {}",
            tasks.len(),
            self.config.normalized_extension(),
            dir.display()
        );

        if !tasks.is_empty() {
            self.check_optimizer();
        }

        let pool = WorkerPool::new(MAX_PARALLELISM)?;
        let optimizer = TaskOptimizer::new(self.config.optimizer.clone());
        let logger = self.logger.clone();

        let outcome = pool
            .run(tasks, move |task| {
                let optimizer = optimizer.clone();
                let logger = logger.clone();
                async move { Self::optimize_task(&optimizer, &logger, task).await }
            })
            .await;
        debug!("{} of {} tasks failed", outcome.failures.len(), outcome.total());

        let results = outcome.into_result().map_err(|e| {
            error!("Run aborted after all tasks finished: {}", e);
            e
        })?;

        self.logger.announce_completion()?;

        let stats = RunStats::from_results(&results);
        info!("{} in {:.2}s", stats.format_summary(), start_time.elapsed().as_secs_f64());
        Ok(stats)
    }

    /// START, invocazione, END per un singolo file
    async fn optimize_task(
        optimizer: &TaskOptimizer,
        logger: &ConsoleLogger<W>,
        task: FileTask,
    ) -> Result<InvocationResult, OptimizeError> {
        logger.announce_start(&task.name)?;

        let result = optimizer.invoke(&task).await.map_err(|e| {
            error!("{}", e);
            e
        })?;

        if result.exit_code != 0 {
            debug!("{} exited with non-zero status {}", task.name, result.exit_code);
        }
        logger.announce_end(&task.name, result.exit_code)?;
        Ok(result)
    }

    /// Diagnostica: l'ottimizzatore è raggiungibile?
    fn check_optimizer(&self) {
        let program = &self.config.optimizer.program;
        match self.tool_resolver.resolve_tool(program) {
            Some(path) => debug!("Using optimizer {} -> {}", program, path.display()),
            None => warn!(
                "Optimizer '{}' not found on PATH, every file will fail to launch",
                program
            ),
        }
    }
}
