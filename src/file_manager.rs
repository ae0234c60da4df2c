//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file da ottimizzare.
//!
//! ## Responsabilità:
//! - Discovery NON ricorsiva dei file in una singola directory
//! - Filtro per estensione (case-insensitive)
//! - Costruzione dei `FileTask` con path assoluto e nome da mostrare
//!
//! ## Regole di discovery:
//! - Solo i file direttamente dentro la directory (nessuna sottocartella)
//! - I symlink contano solo se puntano a un file regolare
//! - L'ordine dei risultati non è garantito
//! - Directory mancante o non leggibile: `OptimizeError::Discovery` (fatale)
//!
//! ## Esempio:
//! ```rust,ignore
//! let tasks = FileManager::find_files(Path::new("."), "png")?;
//! for task in &tasks {
//!     println!("{}", task.name);
//! }
//! ```

use crate::error::OptimizeError;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One discovered file, consumed by exactly one worker
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTask {
    /// Absolute path of the file
    pub path: PathBuf,
    /// File name shown in the console lines
    pub name: String,
}

impl FileTask {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        Self { path, name }
    }
}

/// Manages file discovery
pub struct FileManager;

impl FileManager {
    /// Find files with the given extension directly inside `dir`
    pub fn find_files(dir: &Path, extension: &str) -> Result<Vec<FileTask>, OptimizeError> {
        let dir = Self::absolute(dir).map_err(|source| OptimizeError::Discovery {
            path: dir.to_path_buf(),
            source,
        })?;

        let metadata = std::fs::metadata(&dir).map_err(|source| OptimizeError::Discovery {
            path: dir.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(OptimizeError::Discovery {
                path: dir,
                source: io::Error::new(io::ErrorKind::Other, "not a directory"),
            });
        }

        let mut tasks = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| OptimizeError::Discovery {
                path: dir.clone(),
                source: e.into(),
            })?;

            let path = entry.path();
            let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && path.is_file());
            if is_file && Self::has_extension(path, extension) {
                tasks.push(FileTask::new(path.to_path_buf()));
            }
        }

        debug!("Discovered {} .{} files in {}", tasks.len(), extension, dir.display());
        Ok(tasks)
    }

    /// Check a path's extension, ignoring case
    pub fn has_extension(path: &Path, extension: &str) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false)
    }

    /// Anchor `dir` at the current directory, without `.` segments
    fn absolute(dir: &Path) -> io::Result<PathBuf> {
        let base = if dir.is_absolute() {
            PathBuf::new()
        } else {
            std::env::current_dir()?
        };

        Ok(dir
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .fold(base, |mut acc, c| {
                acc.push(c);
                acc
            }))
    }
}
