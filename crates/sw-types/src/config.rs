//! Report configuration.
//!
//! A [`ReportConfig`] is built once at startup and passed explicitly into the
//! loader and the presentation layer. Values come from, in order:
//! 1. Defaults in code
//! 2. An optional JSON configuration file
//! 3. Environment variable overrides with the `STOCKWATCH_` prefix

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{ConfigError, SwResult};
use crate::window::SalesWindow;

pub const ENV_SOURCES: &str = "STOCKWATCH_SOURCES";
pub const ENV_CATEGORIES: &str = "STOCKWATCH_CATEGORIES";
pub const ENV_FORMAT: &str = "STOCKWATCH_FORMAT";
pub const ENV_EXPORT_DIR: &str = "STOCKWATCH_EXPORT_DIR";

/// Output format of the rendered report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::InvalidValue {
                key: ENV_FORMAT.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Main report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Heading printed above the report
    pub title: String,

    /// Source exports, concatenated in this order
    pub sources: Vec<PathBuf>,

    /// Six-month sales window the exports cover
    pub window: SalesWindow,

    /// Categories to show. `None` shows every category present in the data.
    pub categories: Option<Vec<String>>,

    /// Reject columns outside the input contract instead of ignoring them
    pub strict_columns: bool,

    pub output: OutputFormat,

    /// When set, flagged rows are also written here as CSV
    pub export_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Stock & Purchase Insights".to_string(),
            sources: vec![
                PathBuf::from("safa purchase 1.csv"),
                PathBuf::from("safa purchase 2.csv"),
            ],
            window: SalesWindow::default(),
            categories: None,
            strict_columns: false,
            output: OutputFormat::Text,
            export_dir: None,
        }
    }
}

impl ReportConfig {
    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> SwResult<Self> {
        let path = path.as_ref();
        tracing::info!("Loading configuration from: {}", path.display());
        let raw = fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Apply `STOCKWATCH_*` overrides from the process environment.
    pub fn apply_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(sources) = lookup(ENV_SOURCES) {
            self.sources = split_list(&sources, ';').into_iter().map(PathBuf::from).collect();
        }
        if let Some(categories) = lookup(ENV_CATEGORIES) {
            let categories = split_list(&categories, ',');
            self.categories = if categories.is_empty() { None } else { Some(categories) };
        }
        if let Some(format) = lookup(ENV_FORMAT) {
            self.output = format.parse()?;
        }
        if let Some(dir) = lookup(ENV_EXPORT_DIR) {
            let dir = dir.trim();
            self.export_dir = if dir.is_empty() { None } else { Some(PathBuf::from(dir)) };
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate()?;
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        Ok(())
    }
}

fn split_list(raw: &str, sep: char) -> Vec<String> {
    raw.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
