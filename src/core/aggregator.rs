use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ExtractionOptions;
use crate::error::SigscribeError;
use super::classifier;
use super::parser::CodeParser;
use super::report::Report;

/// A file that was skipped because it could not be read or parsed
#[derive(Debug)]
pub struct FileFailure {
    /// Report key the file would have had
    pub path: String,
    pub error: SigscribeError,
}

/// Outcome of running the classifier over a list of files
#[derive(Debug, Default)]
pub struct Aggregation {
    pub report: Report,

    /// Files that parsed successfully, including ones dropped as empty
    pub parsed: usize,

    pub failures: Vec<FileFailure>,
}

/// Parse and classify every file in order, isolating per-file failures.
///
/// Each failure produces exactly one warning-level event and processing
/// continues with the next file.
pub fn aggregate(
    root: &Path,
    files: &[PathBuf],
    parser: &mut CodeParser,
    options: &ExtractionOptions,
) -> Aggregation {
    let mut aggregation = Aggregation::default();

    for file in files {
        let full_path = if file.is_absolute() { file.clone() } else { root.join(file) };
        let key = relative_key(root, &full_path);

        let parsed = match parser.parse_file(&full_path) {
            Ok(parsed) => parsed,
            Err(error) => {
                let failure = FileFailure { path: key, error };
                warn!(event = failure.error.event(), path = %failure.path, "{}", failure.error);
                aggregation.failures.push(failure);
                continue;
            }
        };

        aggregation.parsed += 1;
        let entry = classifier::classify(&parsed, options);

        if !options.report_empty_items && entry.is_empty() {
            debug!(path = %key, "Skipping file with no functions or classes");
            continue;
        }
        aggregation.report.insert(key, entry);
    }

    aggregation
}

/// `path` relative to `root`, joined with `/` on every platform.
///
/// Paths outside `root` climb out with `..`; when no relative form exists
/// (one side absolute, the other not, or different drives) the path is kept
/// as given.
pub fn relative_key(root: &Path, path: &Path) -> String {
    if let Ok(relative) = path.strip_prefix(root) {
        return join_components(relative.components());
    }

    let root_parts: Vec<Component> = root.components().filter(|c| *c != Component::CurDir).collect();
    let path_parts: Vec<Component> = path.components().filter(|c| *c != Component::CurDir).collect();
    let common = root_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let comparable = root.is_absolute() == path.is_absolute()
        && (common > 0 || !path.is_absolute())
        && root_parts[common..].iter().all(|c| matches!(c, Component::Normal(_)));
    if !comparable {
        return path.to_string_lossy().replace('\\', "/");
    }

    let climb = std::iter::repeat(Component::ParentDir).take(root_parts.len() - common);
    join_components(climb.chain(path_parts[common..].iter().copied()))
}

fn join_components<'a>(components: impl Iterator<Item = Component<'a>>) -> String {
    components
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory sink for formatted log lines
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn run_captured(root: &Path, files: &[PathBuf], options: ExtractionOptions) -> (Aggregation, Vec<String>) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let aggregation = tracing::subscriber::with_default(subscriber, || {
            let mut parser = CodeParser::new().unwrap();
            aggregate(root, files, &mut parser, &options)
        });
        (aggregation, logs.lines())
    }

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_syntax_error_is_skipped_with_one_warning() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let files = vec![
            write(root, "a.py", "def a(): pass\n"),
            write(root, "pkg/broken.py", "def broken(:\n    pass\n"),
            write(root, "pkg/c.py", "class C:\n    def m(self): pass\n"),
        ];

        let (aggregation, logs) = run_captured(root, &files, ExtractionOptions::default());

        let keys: Vec<&str> = aggregation.report.paths().collect();
        assert_eq!(keys, vec!["a.py", "pkg/c.py"]);
        assert_eq!(aggregation.parsed, 2);
        assert_eq!(aggregation.failures.len(), 1);
        assert!(matches!(aggregation.failures[0].error, SigscribeError::Syntax { .. }));

        let warnings: Vec<&String> = logs.iter().filter(|line| line.contains("WARN")).collect();
        assert_eq!(warnings.len(), 1, "logs: {logs:?}");
        assert!(warnings[0].contains("pkg/broken.py"));
        assert!(warnings[0].contains("syntax_error"));
    }

    #[test]
    fn test_deeply_nested_file_is_skipped_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let depth = 100_000;
        let deep = format!("def f(a={}1{}):\n    pass\n", "(".repeat(depth), ")".repeat(depth));
        let files = vec![write(root, "deep.py", &deep), write(root, "ok.py", "def ok(): pass\n")];

        let (aggregation, logs) = run_captured(root, &files, ExtractionOptions::default());

        assert_eq!(aggregation.report.paths().collect::<Vec<_>>(), vec!["ok.py"]);
        assert_eq!(aggregation.failures.len(), 1);
        assert_eq!(aggregation.failures[0].path, "deep.py");
        assert!(aggregation.failures[0].error.to_string().contains("too many nested parentheses"));

        let warnings: Vec<&String> = logs.iter().filter(|line| line.contains("WARN")).collect();
        assert_eq!(warnings.len(), 1, "logs: {logs:?}");
        assert!(warnings[0].contains("deep.py"));
    }

    #[test]
    fn test_python2_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let files = vec![
            write(root, "legacy.py", "def legacy((a, b), c=3):\n    print \"hi\"\n"),
            write(root, "modern.py", "def modern(a, b=3):\n    print(\"hi\")\n"),
        ];

        let (aggregation, logs) = run_captured(root, &files, ExtractionOptions::default());

        assert_eq!(aggregation.report.paths().collect::<Vec<_>>(), vec!["modern.py"]);
        assert!(matches!(aggregation.failures[0].error, SigscribeError::Syntax { .. }));
        assert_eq!(logs.iter().filter(|line| line.contains("WARN")).count(), 1);
    }

    #[test]
    fn test_missing_file_is_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let files = vec![root.join("gone.py"), write(root, "here.py", "def f(): pass\n")];

        let (aggregation, logs) = run_captured(root, &files, ExtractionOptions::default());

        assert_eq!(aggregation.report.paths().collect::<Vec<_>>(), vec!["here.py"]);
        assert!(matches!(aggregation.failures[0].error, SigscribeError::FileNotFound(_)));
        assert!(logs.iter().any(|line| line.contains("file_not_found") && line.contains("gone.py")));
    }

    #[test]
    fn test_relative_inputs_resolve_against_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "sub/mod.py", "def f(): pass\n");

        let (aggregation, _) = run_captured(root, &[PathBuf::from("sub/mod.py")], ExtractionOptions::default());
        assert!(aggregation.report.get("sub/mod.py").is_some());
    }

    #[test]
    fn test_empty_files_dropped_only_when_compact() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let files = vec![write(root, "empty.py", "# nothing here\n"), write(root, "f.py", "def f(): pass\n")];

        let (keep, _) = run_captured(root, &files, ExtractionOptions::default());
        assert_eq!(keep.report.len(), 2);

        let compact = ExtractionOptions { omit_docstrings: false, report_empty_items: false };
        let (skip, _) = run_captured(root, &files, compact);
        assert_eq!(skip.report.paths().collect::<Vec<_>>(), vec!["f.py"]);
        assert_eq!(skip.parsed, 2);
    }

    #[test]
    fn test_relative_key_uses_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(relative_key(root, Path::new("/repo/a/b/c.py")), "a/b/c.py");
        assert_eq!(relative_key(Path::new("."), Path::new("./pkg/m.py")), "pkg/m.py");
    }

    #[test]
    fn test_relative_key_outside_root_climbs_out() {
        let root = Path::new("/repo/src");
        assert_eq!(relative_key(root, Path::new("/repo/lib/x.py")), "../lib/x.py");
        assert_eq!(relative_key(root, Path::new("/elsewhere/x.py")), "../../elsewhere/x.py");
        assert_ne!(
            relative_key(root, Path::new("/repo/src/elsewhere/x.py")),
            relative_key(root, Path::new("/elsewhere/x.py"))
        );
        assert_eq!(relative_key(Path::new("proj"), Path::new("other/m.py")), "../other/m.py");
    }

    #[test]
    fn test_relative_key_keeps_unrelatable_paths() {
        assert_eq!(relative_key(Path::new("proj"), Path::new("/abs/m.py")), "/abs/m.py");
        assert_eq!(relative_key(Path::new("../up"), Path::new("m.py")), "m.py");
    }
}
