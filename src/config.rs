//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri del batch
//! - Definisce `OptimizerConfig` con programma e template degli argomenti
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `extension`: Estensione dei file da ottimizzare (default: "png")
//! - `optimizer.program`: Eseguibile risolto tramite PATH (default: "optipng")
//! - `optimizer.strip_flag` / `strip_value`: Rimozione metadata (default: "--strip all")
//! - `optimizer.level_flag` / `level`: Livello di compressione (default: "-o 6")
//!
//! Il numero di worker NON è configurabile: vedi `MAX_PARALLELISM`.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     optimizer: OptimizerConfig::legacy(),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::OptimizeError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Upper bound of optimizer processes running at the same time
pub const MAX_PARALLELISM: usize = 7;

/// Highest level accepted by optipng's `-o`
pub const MAX_OPTIMIZATION_LEVEL: u8 = 7;

/// External optimizer invocation template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Executable name (looked up on PATH) or absolute path
    pub program: String,
    /// Metadata stripping flag
    pub strip_flag: String,
    /// Value passed after `strip_flag`
    pub strip_value: String,
    /// Compression effort flag
    pub level_flag: String,
    /// Compression effort level
    pub level: u8,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            program: "optipng".to_string(),
            strip_flag: "--strip".to_string(),
            strip_value: "all".to_string(),
            level_flag: "-o".to_string(),
            level: 6,
        }
    }
}

impl OptimizerConfig {
    /// Older invocation variant: `-strip all -o 7`
    pub fn legacy() -> Self {
        Self {
            strip_flag: "-strip".to_string(),
            level: 7,
            ..Self::default()
        }
    }

    /// Full argument vector for one target, path last.
    pub fn build_args(&self, target: &Path) -> Vec<OsString> {
        vec![
            OsString::from(&self.strip_flag),
            OsString::from(&self.strip_value),
            OsString::from(&self.level_flag),
            OsString::from(self.level.to_string()),
            target.as_os_str().to_os_string(),
        ]
    }
}

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extension of the files to optimize, without the leading dot
    pub extension: String,
    /// Optimizer invocation
    pub optimizer: OptimizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: "png".to_string(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(OptimizeError::Validation("File extension must not be empty".to_string()));
        }

        if self.optimizer.program.trim().is_empty() {
            return Err(OptimizeError::Validation("Optimizer program must not be empty".to_string()));
        }

        if self.optimizer.level > MAX_OPTIMIZATION_LEVEL {
            return Err(OptimizeError::Validation(format!(
                "Optimization level must be between 0 and {}",
                MAX_OPTIMIZATION_LEVEL
            )));
        }

        Ok(())
    }

    /// Extension without a leading dot
    pub fn normalized_extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self, OptimizeError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}
