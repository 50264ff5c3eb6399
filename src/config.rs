use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::loader::LoadOptions;

/// Env var naming a JSON config file.
pub const CONFIG_ENV: &str = "GAPMINDER_CONFIG";
/// Env var naming the dataset file; overrides the config file.
pub const DATA_ENV: &str = "GAPMINDER_DATA";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("delimiter must be a single ASCII character, got '{0}'")]
    Delimiter(String),
}

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

/// Startup settings. Every field has a default so a config file only needs
/// the keys it changes:
///
/// ```json
/// { "dataset": "data/gapminder.csv", "initial_year": 2005 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorerConfig {
    pub dataset: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub initial_year: i32,
    pub window_size: [f32; 2],
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            delimiter: None,
            initial_year: 2005,
            window_size: [1280.0, 860.0],
        }
    }
}

impl ExplorerConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the file named by `GAPMINDER_CONFIG`, then
    /// `GAPMINDER_DATA`, then the first command-line argument.
    pub fn resolve(args: impl IntoIterator<Item = String>) -> Result<Self, ConfigError> {
        let file = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let data = std::env::var_os(DATA_ENV).map(PathBuf::from);
        Self::resolve_from(file.as_deref(), data, args)
    }

    fn resolve_from(
        file: Option<&Path>,
        data: Option<PathBuf>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => {
                log::info!("Reading config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        if let Some(path) = data {
            config.dataset = Some(path);
        }
        if let Some(arg) = args.into_iter().next() {
            config.dataset = Some(PathBuf::from(arg));
        }
        // Validate eagerly so a bad delimiter fails before the window opens.
        config.load_options()?;
        Ok(config)
    }

    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        let delimiter = match self.delimiter.as_deref() {
            None => None,
            Some("\\t") => Some(b'\t'),
            Some(s) => match s.as_bytes() {
                [b] if b.is_ascii() => Some(*b),
                _ => return Err(ConfigError::Delimiter(s.to_string())),
            },
        };
        Ok(LoadOptions { delimiter })
    }
}
