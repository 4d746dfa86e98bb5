use clap::Parser;
use std::path::PathBuf;
use anyhow::Result;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "sigscribe")]
#[command(about = "Extract function and class signatures from a Python codebase")]
#[command(version)]
pub struct Cli {
    /// Root directory of the Python codebase
    pub codebase_path: PathBuf,

    /// Output JSON file (defaults to ast_signature_output.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Leave docstrings out of the report
    #[arg(long)]
    pub omit_docstrings: bool,

    /// Drop classes, files and mappings with nothing in them
    #[arg(long)]
    pub skip_empty: bool,

    /// Skip files matched by .gitignore while walking the codebase
    #[arg(long)]
    pub respect_gitignore: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, engine: &mut Engine) {
        let config = engine.config_mut();
        if self.omit_docstrings {
            config.extraction.omit_docstrings = true;
        }
        if self.skip_empty {
            config.extraction.report_empty_items = false;
        }
        if self.respect_gitignore {
            config.discovery.respect_gitignore = true;
        }
    }

    pub fn execute(self, mut engine: Engine) -> Result<()> {
        self.apply_overrides(&mut engine);
        engine.run(&self.codebase_path, self.output)
    }
}
