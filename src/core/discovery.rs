use std::path::{Path, PathBuf};
use ignore::WalkBuilder;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;
use crate::error::{SigscribeError, Result};

/// Recursively collect source files under `root`, sorted by path
pub fn discover_files<P: AsRef<Path>>(root: P, config: &DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut files = Vec::new();

    if config.respect_gitignore {
        // Use ignore crate to respect .gitignore and custom patterns
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| SigscribeError::FileSystem(e.to_string()))?;
            let path = entry.path();
            if entry.file_type().is_some_and(|t| t.is_file()) && should_collect(path, config) {
                files.push(path.to_path_buf());
            }
        }
    } else {
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| SigscribeError::FileSystem(e.to_string()))?;
            let path = entry.path();
            if entry.file_type().is_file() && should_collect(path, config) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    info!("Found {} Python files.", files.len());
    Ok(files)
}

/// Extension and size filter
fn should_collect(path: &Path, config: &DiscoveryConfig) -> bool {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    if !config.extensions.iter().any(|e| e == extension) {
        return false;
    }

    match std::fs::metadata(path) {
        Ok(metadata) if metadata.len() > config.max_file_size => {
            debug!(path = %path.display(), size = metadata.len(), "Skipping oversized file");
            false
        }
        // Unreadable metadata is left for the parser to report
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg/sub")).unwrap();
        fs::create_dir_all(root.join("build")).unwrap();
        fs::write(root.join("main.py"), "def main(): pass\n").unwrap();
        fs::write(root.join("pkg/__init__.py"), "").unwrap();
        fs::write(root.join("pkg/sub/util.py"), "def util(): pass\n").unwrap();
        fs::write(root.join("build/generated.py"), "def gen(): pass\n").unwrap();
        fs::write(root.join("README.md"), "# readme\n").unwrap();
        fs::write(root.join("script.pyc"), "binary").unwrap();
        dir
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collects_python_files_recursively_and_sorted() {
        let dir = make_tree();
        let files = discover_files(dir.path(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(
            relative(dir.path(), &files),
            vec!["build/generated.py", "main.py", "pkg/__init__.py", "pkg/sub/util.py"]
        );
    }

    #[test]
    fn test_respects_gitignore_when_enabled() {
        let dir = make_tree();
        let root = dir.path();
        // The ignore crate needs a .git dir to recognize .gitignore files
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".gitignore"), "build/\n").unwrap();

        let plain = discover_files(root, &DiscoveryConfig::default()).unwrap();
        assert!(relative(root, &plain).contains(&"build/generated.py".to_string()));

        let config = DiscoveryConfig { respect_gitignore: true, ..DiscoveryConfig::default() };
        let filtered = discover_files(root, &config).unwrap();
        let names = relative(root, &filtered);
        assert!(!names.iter().any(|p| p.starts_with("build")));
        assert!(names.contains(&"main.py".to_string()));
    }

    #[test]
    fn test_skips_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big.py"), "x = 1\n".repeat(100)).unwrap();
        fs::write(dir.path().join("small.py"), "x = 1\n").unwrap();

        let config = DiscoveryConfig { max_file_size: 64, ..DiscoveryConfig::default() };
        let files = discover_files(dir.path(), &config).unwrap();
        assert_eq!(relative(dir.path(), &files), vec!["small.py"]);
    }

    #[test]
    fn test_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stub.pyi"), "def f() -> int: ...\n").unwrap();
        fs::write(dir.path().join("mod.py"), "def f(): pass\n").unwrap();

        let config = DiscoveryConfig {
            extensions: vec!["pyi".to_string()],
            ..DiscoveryConfig::default()
        };
        let files = discover_files(dir.path(), &config).unwrap();
        assert_eq!(relative(dir.path(), &files), vec!["stub.pyi"]);
    }
}
