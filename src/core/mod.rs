// Source parsing and typed syntax views
mod parser;
mod syntax;

// Extraction pipeline
mod docstring;
mod signature;
mod classifier;
mod aggregator;
mod report;

// File system boundaries
mod discovery;
mod writer;

mod engine;

pub use report::{build_report, ClassEntry, Declaration, FileEntry, Report};
pub use discovery::discover_files;
pub use writer::write_report;

// Export the main engine
pub use engine::Engine;
