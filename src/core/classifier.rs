use indexmap::IndexMap;
use tree_sitter::Node;
use tracing::debug;

use crate::config::ExtractionOptions;
use super::docstring;
use super::parser::ParsedSource;
use super::report::{ClassEntry, Declaration, FileEntry};
use super::signature::Signature;
use super::syntax::{self, ClassNode, FunctionNode, Statement};

/// Classify the top-level declarations of one parsed file.
///
/// Only module-level functions and classes, plus the functions directly in
/// a class body, are collected. Later definitions replace earlier ones with
/// the same name.
pub fn classify(parsed: &ParsedSource, options: &ExtractionOptions) -> FileEntry {
    let source = parsed.bytes();
    let mut functions = IndexMap::new();
    let mut classes = IndexMap::new();

    for statement in syntax::body_statements(parsed.root(), source) {
        match statement {
            Statement::Function(func) => {
                let declaration = build_declaration(&func, source, options);
                functions.insert(func.name, declaration);
            }
            Statement::Class(class) => {
                let entry = class_entry(&class, source, options);
                if options.report_empty_items || !entry.is_empty() {
                    classes.insert(class.name, entry);
                } else {
                    // Same-named empty class still shadows the earlier one
                    classes.shift_remove(&class.name);
                }
            }
            Statement::Other => {}
        }
    }

    debug!(
        path = %parsed.path.display(),
        functions = functions.len(),
        classes = classes.len(),
        "Classified declarations"
    );

    FileEntry {
        functions: keep(functions, options),
        classes: keep(classes, options),
    }
}

fn build_declaration(func: &FunctionNode<'_>, source: &[u8], options: &ExtractionOptions) -> Declaration {
    let signature = Signature::from_function(func, source);
    Declaration {
        signature: signature.render(),
        docstring: docstring_field(func.body, source, options),
        is_async: signature.is_async(),
    }
}

fn class_entry(class: &ClassNode<'_>, source: &[u8], options: &ExtractionOptions) -> ClassEntry {
    let mut methods = IndexMap::new();

    if let Some(body) = class.body {
        for member in syntax::body_statements(body, source) {
            if let Statement::Function(method) = member {
                let declaration = build_declaration(&method, source, options);
                methods.insert(method.name, declaration);
            }
        }
    }

    ClassEntry {
        methods: keep(methods, options),
        docstring: docstring_field(class.body, source, options),
    }
}

/// Docstring key contents under the current options.
///
/// With empty items reported, a missing docstring becomes `""` so every
/// entry has the key; otherwise only real text is kept.
fn docstring_field(body: Option<Node<'_>>, source: &[u8], options: &ExtractionOptions) -> Option<String> {
    if !options.include_docstrings() {
        return None;
    }
    let text = body.and_then(|body| docstring::extract(body, source));
    if options.report_empty_items {
        Some(text.unwrap_or_default())
    } else {
        text.filter(|doc| !doc.is_empty())
    }
}

fn keep<V>(map: IndexMap<String, V>, options: &ExtractionOptions) -> Option<IndexMap<String, V>> {
    (options.report_empty_items || !map.is_empty()).then_some(map)
}
