//! CLI configuration file.

use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic, Result, miette};
use nebula_renderer::{RenderOptions, Theme};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub render: RenderOptions,
    pub store: StoreConfig,
}

/// Where the working document lives when no input file is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn document_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("nebula").join("document.md")))
    }
}

impl Config {
    /// Read a `.toml` or `.json` config, chosen by extension.
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&text).into_diagnostic()?,
            Some("toml") => toml::from_str(&text).into_diagnostic()?,
            _ => return Err(miette!("Unsupported config format: {}", path.display())),
        };
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// The explicit path if given, else the user config file if it exists,
    /// else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load_file(&path),
            _ => Ok(Self::default()),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nebula").join("config.toml"))
}
