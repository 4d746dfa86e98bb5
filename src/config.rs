use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SigscribeError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// What goes into the report
    #[serde(default)]
    pub extraction: ExtractionOptions,

    /// Which files are collected from the codebase
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Switches controlling docstrings and empty entries in the report.
///
/// Fixed for the duration of a run and passed explicitly to the classifier
/// and aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Drop every docstring field from the report
    #[serde(default)]
    pub omit_docstrings: bool,

    /// Keep classes, files and mappings that carry no information
    #[serde(default = "default_report_empty_items")]
    pub report_empty_items: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// File extensions to collect (without the dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Maximum file size to parse (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Honour .gitignore and friends while walking
    #[serde(default)]
    pub respect_gitignore: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default JSON output file
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

fn default_report_empty_items() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_max_file_size() -> u64 {
    1024 * 1024 // 1MB
}

fn default_output_path() -> PathBuf {
    PathBuf::from("ast_signature_output.json")
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            omit_docstrings: false,
            report_empty_items: default_report_empty_items(),
        }
    }
}

impl ExtractionOptions {
    pub fn include_docstrings(&self) -> bool {
        !self.omit_docstrings
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            max_file_size: default_max_file_size(),
            respect_gitignore: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SigscribeError::Config(e.to_string()))
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = [
                    "Sigscribe.toml",
                    "sigscribe.toml",
                    ".sigscribe.toml",
                ];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
