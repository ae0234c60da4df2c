//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Definisce `TaskFailure` / `FailedTasks` per l'aggregato di fine run
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Discovery`: Directory mancante o non leggibile (fatale, prima del dispatch)
//! - `Launch`: Impossibile avviare l'ottimizzatore esterno per un file
//! - `Wait`: Errore durante l'attesa del processo figlio
//! - `TaskPanicked`: Panic inatteso dentro un worker
//! - `TasksFailed`: Aggregato di tutti i fallimenti per-task dopo il drain
//! - `Config` / `Validation`: Configurazione non valida
//! - `Io`: Errori di I/O (scrittura su console, etc.)
//!
//! ## Esempio:
//! ```rust,ignore
//! if !dir.is_dir() {
//!     return Err(OptimizeError::Discovery { path, source });
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

/// Custom error types for batch optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read directory {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch '{program}' for {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for optimizer on {}: {source}", path.display())]
    Wait {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker panicked while processing {name}: {message}")]
    TaskPanicked { name: String, message: String },

    #[error("{0}")]
    TasksFailed(FailedTasks),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// One task that ended in `Failed(error)`
#[derive(Debug)]
pub struct TaskFailure {
    pub name: String,
    pub error: OptimizeError,
}

/// Aggregate of every per-task failure collected after the pool drained
#[derive(Debug, Default)]
pub struct FailedTasks {
    pub failures: Vec<TaskFailure>,
}

impl FailedTasks {
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for FailedTasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} task(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {}: {}", failure.name, failure.error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_tasks_display_lists_every_failure() {
        let failed = FailedTasks {
            failures: vec![
                TaskFailure {
                    name: "a.png".to_string(),
                    error: OptimizeError::TaskPanicked {
                        name: "a.png".to_string(),
                        message: "boom".to_string(),
                    },
                },
                TaskFailure {
                    name: "b.png".to_string(),
                    error: OptimizeError::Launch {
                        path: PathBuf::from("/tmp/b.png"),
                        program: "optipng".to_string(),
                        source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    },
                },
            ],
        };

        let text = OptimizeError::TasksFailed(failed).to_string();
        assert!(text.starts_with("2 task(s) failed"));
        assert!(text.contains("a.png: Worker panicked while processing a.png: boom"));
        assert!(text.contains("b.png: Failed to launch 'optipng' for /tmp/b.png"));
    }

    #[test]
    fn test_failed_tasks_empty() {
        let failed = FailedTasks::default();
        assert!(failed.is_empty());
        assert_eq!(failed.len(), 0);
    }
}
