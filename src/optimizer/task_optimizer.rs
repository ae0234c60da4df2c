//! # Task Optimizer Module
//!
//! Worker per l'ottimizzazione di singoli file: lancia l'ottimizzatore esterno
//! su un `FileTask`, aspetta che termini e restituisce l'exit code.
//!
//! Gli argomenti sono passati come vettore (mai tramite shell). Nessuna cattura
//! dell'output, nessun retry, nessun timeout: un processo bloccato occupa il suo
//! slot finché non termina.

use crate::{config::OptimizerConfig, error::OptimizeError, file_manager::FileTask};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, warn};

/// A task paired with the exit status of its optimizer process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub task: FileTask,
    pub exit_code: i32,
}

/// Runs the external optimizer for one file at a time
#[derive(Debug, Clone)]
pub struct TaskOptimizer {
    pub config: OptimizerConfig,
}

impl TaskOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Launch the optimizer on `task` and wait for it to exit
    pub async fn invoke(&self, task: &FileTask) -> Result<InvocationResult, OptimizeError> {
        let args = self.config.build_args(&task.path);
        debug!("Running {} {:?}", self.config.program, args);

        let start_time = std::time::Instant::now();
        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OptimizeError::Launch {
                path: task.path.clone(),
                program: self.config.program.clone(),
                source,
            })?;

        let status = match child.wait().await {
            Ok(status) => status,
            Err(source) => {
                // Il figlio va comunque terminato e raccolto
                warn!("Wait failed for {}, killing optimizer process", task.name);
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(OptimizeError::Wait {
                    path: task.path.clone(),
                    source,
                });
            }
        };

        let exit_code = exit_code(status);
        debug!("{} finished with ExitCode={} in {:?}", task.name, exit_code, start_time.elapsed());

        Ok(InvocationResult {
            task: task.clone(),
            exit_code,
        })
    }
}

/// Integer status of a finished process; signal deaths map to 128 + signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
