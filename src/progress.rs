//! # Progress Reporting and Statistics Module
//!
//! Questo modulo gestisce l'output di avanzamento su console e le statistiche del run.
//!
//! ## Responsabilità:
//! - `ConsoleLogger`: serializza le righe START/END tra worker concorrenti
//! - `RunStats`: conta file processati, exit code zero e non-zero
//!
//! ## Formato output (stdout, una riga per chiamata):
//! ```text
//! START: photo.png
//! END  : photo.png (ExitCode=0)
//! 全ての PNG 最適化が完了しました。
//! ```
//!
//! ## Concorrenza:
//! - Il writer è posseduto dal logger dietro un singolo `std::sync::Mutex`
//! - Ogni riga viene scritta e flushata con il lock acquisito (mai attraverso un `.await`)
//! - Tutti i worker condividono la stessa istanza via `Arc`
//!
//! ## Esempio:
//! ```rust,ignore
//! let logger = Arc::new(ConsoleLogger::stdout());
//! logger.announce_start("photo.png")?;
//! logger.announce_end("photo.png", 0)?;
//! logger.announce_completion()?;
//! ```

use crate::optimizer::task_optimizer::InvocationResult;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Final line of a successful run
pub const COMPLETION_MESSAGE: &str = "全ての PNG 最適化が完了しました。";

/// Line-oriented progress output shared by all workers
pub struct ConsoleLogger<W: Write + Send> {
    writer: Mutex<W>,
}

impl ConsoleLogger<io::Stdout> {
    /// Logger writing to the process standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Emit `START: <name>`
    pub fn announce_start(&self, name: &str) -> io::Result<()> {
        self.write_line(&format!("START: {}", name))
    }

    /// Emit `END  : <name> (ExitCode=<status>)`
    pub fn announce_end(&self, name: &str, status: i32) -> io::Result<()> {
        self.write_line(&format!("END  : {} (ExitCode={})", name, status))
    }

    /// Emit the completion line. Only called once the pool has drained,
    /// so the lock is uncontended here.
    pub fn announce_completion(&self) -> io::Result<()> {
        self.write_line(COMPLETION_MESSAGE)
    }

    /// Give back the writer (tests read captured output this way)
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        // Poison only records that another writer panicked
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line)?;
        writer.flush()
    }
}

/// Statistics for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub files_processed: usize,
    pub zero_exits: usize,
    pub nonzero_exits: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: &InvocationResult) {
        self.files_processed += 1;
        if result.exit_code == 0 {
            self.zero_exits += 1;
        } else {
            self.nonzero_exits += 1;
        }
    }

    pub fn from_results(results: &[InvocationResult]) -> Self {
        let mut stats = Self::new();
        for result in results {
            stats.add_result(result);
        }
        stats
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | ExitCode=0: {} | Non-zero ExitCode: {}",
            self.files_processed, self.zero_exits, self.nonzero_exits
        )
    }
}
