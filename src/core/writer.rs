use std::path::Path;
use tracing::info;

use crate::error::{SigscribeError, Result};
use super::report::Report;

/// Write the report as pretty-printed UTF-8 JSON
pub fn write_report<P: AsRef<Path>>(report: &Report, output: P) -> Result<()> {
    let path = output.as_ref();
    let json = report.to_json_pretty()?;

    let written = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).and_then(|_| std::fs::write(path, &json))
        }
        _ => std::fs::write(path, &json),
    };

    written.map_err(|source| SigscribeError::Write { path: path.to_path_buf(), source })?;

    info!("AST signature output written to {}", path.display());
    Ok(())
}
