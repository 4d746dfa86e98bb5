use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::config::ExtractionOptions;
use crate::error::{SigscribeError, Result};
use super::aggregator;
use super::parser::CodeParser;

/// A function or method entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub signature: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,

    #[serde(rename = "async", skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<IndexMap<String, Declaration>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<IndexMap<String, Declaration>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<IndexMap<String, ClassEntry>>,
}

/// Relative file path (forward slashes) to the file's declarations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    files: IndexMap<String, FileEntry>,
}

impl ClassEntry {
    #[cfg(test)]
    pub fn method(&self, name: &str) -> Option<&Declaration> {
        self.methods.as_ref()?.get(name)
    }

    /// No methods and no docstring text
    pub fn is_empty(&self) -> bool {
        self.methods.as_ref().map_or(true, |m| m.is_empty())
            && self.docstring.as_deref().map_or(true, str::is_empty)
    }
}

impl FileEntry {
    #[cfg(test)]
    pub fn function(&self, name: &str) -> Option<&Declaration> {
        self.functions.as_ref()?.get(name)
    }

    #[cfg(test)]
    pub fn class(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.as_ref()?.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.as_ref().map_or(true, |f| f.is_empty())
            && self.classes.as_ref().map_or(true, |c| c.is_empty())
    }
}

impl Report {
    /// Insert or replace the entry for `path`
    pub fn insert(&mut self, path: String, entry: FileEntry) {
        self.files.insert(path, entry);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
impl Report {
    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.files.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Build the report for `files` discovered under `root`.
///
/// Fails before parsing when `root` is not a directory or `files` is empty,
/// and after parsing when not a single file could be parsed. Fatal errors
/// are returned unlogged; the caller reports them.
pub fn build_report(root: &Path, files: &[PathBuf], options: &ExtractionOptions) -> Result<Report> {
    if !root.is_dir() {
        return Err(SigscribeError::InvalidInput(root.to_path_buf()));
    }
    if files.is_empty() {
        return Err(SigscribeError::NoFilesFound(root.to_path_buf()));
    }

    let mut parser = CodeParser::new()?;
    let aggregation = aggregator::aggregate(root, files, &mut parser, options);

    if aggregation.parsed == 0 {
        return Err(SigscribeError::AggregateFailure { attempted: files.len() });
    }

    info!(
        "Extracted {} of {} files ({} failed)",
        aggregation.report.len(),
        files.len(),
        aggregation.failures.len()
    );
    Ok(aggregation.report)
}
