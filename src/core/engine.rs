// src/core/engine.rs
use std::path::{Path, PathBuf};
use anyhow::Result;
use tracing::{info, debug};

use crate::config::Config;
use crate::error::SigscribeError;
use super::{build_report, discover_files, write_report, Report};

/// Main orchestration engine: discovery, extraction and output
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Create a new engine instance from an optional config file
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        debug!("Loaded configuration: {:?}", config);

        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Discover files under `codebase` and build the signature report
    pub fn extract(&self, codebase: &Path) -> std::result::Result<Report, SigscribeError> {
        // A missing root must surface as invalid input, not as an empty tree
        let files = if codebase.is_dir() {
            discover_files(codebase, &self.config.discovery)?
        } else {
            Vec::new()
        };

        info!("Extracting signatures with AST...");
        build_report(codebase, &files, &self.config.extraction)
    }

    /// Extract signatures and write them to `output` (or the configured path)
    pub fn run(&self, codebase: &Path, output: Option<PathBuf>) -> Result<()> {
        let report = self.extract(codebase)?;

        let output_path = output.unwrap_or_else(|| self.config.output.path.clone());
        write_report(&report, &output_path)?;

        info!("Extraction complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_run_writes_report_for_codebase() {
        let dir = tempfile::tempdir().unwrap();
        let codebase = dir.path().join("project");
        fs::create_dir_all(codebase.join("app")).unwrap();
        fs::write(
            codebase.join("app/models.py"),
            "class User:\n    \"\"\"A user.\"\"\"\n    def __init__(self, name: str) -> None:\n        self.name = name\n",
        )
        .unwrap();

        let output = dir.path().join("out.json");
        let engine = Engine::with_config(Config::default());
        engine.run(&codebase, Some(output.clone())).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            value["app/models.py"]["classes"]["User"]["methods"]["__init__"]["signature"],
            "(self, name: str) -> None"
        );
        assert_eq!(value["app/models.py"]["classes"]["User"]["docstring"], "A user.");
    }

    #[test]
    fn test_extract_rejects_missing_directory() {
        let engine = Engine::with_config(Config::default());
        let err = engine.extract(Path::new("/definitely/not/a/dir")).unwrap_err();
        assert!(matches!(err, SigscribeError::InvalidInput(_)));
    }

    #[test]
    fn test_extract_without_python_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "nothing").unwrap();

        let engine = Engine::with_config(Config::default());
        let err = engine.extract(dir.path()).unwrap_err();
        assert!(matches!(err, SigscribeError::NoFilesFound(_)));
    }

    #[test]
    fn test_config_overrides_apply() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("m.py"), "def f():\n    \"\"\"Doc.\"\"\"\n").unwrap();

        let mut engine = Engine::with_config(Config::default());
        engine.config_mut().extraction.omit_docstrings = true;
        let report = engine.extract(dir.path()).unwrap();
        assert_eq!(report.get("m.py").unwrap().function("f").unwrap().docstring, None);
        assert!(engine.config.extraction.omit_docstrings);
    }
}
