use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

use crate::error::{SigscribeError, Result};

/// Deepest bracket nesting the Python tokenizer accepts
const MAX_BRACKET_DEPTH: usize = 200;

/// A Python source file together with its syntax tree
pub struct ParsedSource {
    /// Path the source was read from
    pub path: PathBuf,

    /// Raw source content
    pub source: String,

    tree: Tree,
}

impl ParsedSource {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }
}

/// Tree-sitter backed Python parser, reused across files
pub struct CodeParser {
    parser: Parser,
}

impl CodeParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let python_language = tree_sitter_python::language();
        parser.set_language(&python_language)
            .map_err(|e| SigscribeError::Parser(format!("Failed to set Python language: {}", e)))?;

        Ok(Self { parser })
    }

    /// Read and parse a single source file
    pub fn parse_file<P: AsRef<Path>>(&mut self, file_path: P) -> Result<ParsedSource> {
        let path = file_path.as_ref();

        let source = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SigscribeError::FileNotFound(path.to_path_buf())
            } else {
                SigscribeError::Read { path: path.to_path_buf(), source: e }
            }
        })?;

        self.parse_source(path.to_path_buf(), source)
    }

    /// Parse source text.
    ///
    /// Trees with error or missing nodes are rejected, and so are the
    /// Python 2 forms and other code the grammar tolerates but Python 3
    /// refuses to compile.
    pub fn parse_source(&mut self, path: PathBuf, source: String) -> Result<ParsedSource> {
        let tree = self.parser.parse(&source, None)
            .ok_or_else(|| SigscribeError::Parser(format!("Failed to parse {}", path.display())))?;

        if let Some(rejection) = first_rejection(tree.root_node()) {
            return Err(SigscribeError::Syntax {
                path,
                line: rejection.line,
                column: rejection.column,
                reason: rejection.reason,
            });
        }

        Ok(ParsedSource { path, source, tree })
    }
}

/// Where and why a tree was refused
#[derive(Debug)]
struct Rejection {
    line: usize,
    column: usize,
    reason: String,
}

impl Rejection {
    fn at(node: Node, reason: impl Into<String>) -> Self {
        let pos = node.start_position();
        Self {
            line: pos.row + 1,
            column: pos.column + 1,
            reason: reason.into(),
        }
    }
}

/// First problem in document order, found with an explicit cursor walk so
/// arbitrarily deep trees never grow the call stack
fn first_rejection(root: Node) -> Option<Rejection> {
    let mut cursor = root.walk();
    let mut depth = 0usize;

    loop {
        let node = cursor.node();
        if let Some(rejection) = check_node(node, &mut depth) {
            return Some(rejection);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node() == root {
                return None;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn check_node(node: Node, depth: &mut usize) -> Option<Rejection> {
    if node.is_error() {
        return Some(Rejection::at(node, "invalid syntax"));
    }
    if node.is_missing() {
        return Some(Rejection::at(node, format!("missing `{}`", node.kind())));
    }

    match node.kind() {
        "print_statement" => Some(Rejection::at(node, "print statement")),
        "exec_statement" => Some(Rejection::at(node, "exec statement")),
        "except_clause" if has_token(node, ",") => {
            Some(Rejection::at(node, "comma-separated exception target"))
        }
        "comparison_operator" if has_token(node, "<>") => Some(Rejection::at(node, "`<>` operator")),
        "parameters" | "lambda_parameters" => misplaced_parameter(node),
        "(" | "[" | "{" if node.child_count() == 0 => {
            *depth += 1;
            (*depth > MAX_BRACKET_DEPTH).then(|| Rejection::at(node, "too many nested parentheses"))
        }
        ")" | "]" | "}" if node.child_count() == 0 => {
            *depth = depth.saturating_sub(1);
            None
        }
        _ => None,
    }
}

/// Whether `node` has a direct anonymous child token of the given kind
fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

/// Tuple parameters and a required parameter after a defaulted one
fn misplaced_parameter(params: Node) -> Option<Rejection> {
    let mut cursor = params.walk();
    let mut seen_default = false;
    let mut keyword_only = false;

    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "tuple_pattern" => return Some(Rejection::at(param, "tuple parameter")),
            "default_parameter" | "typed_default_parameter" => {
                if param.child_by_field_name("name").is_some_and(|name| name.kind() == "tuple_pattern") {
                    return Some(Rejection::at(param, "tuple parameter"));
                }
                seen_default = true;
            }
            "list_splat_pattern" | "keyword_separator" => keyword_only = true,
            "identifier" | "keyword_identifier" | "typed_parameter" => {
                let inner = if param.kind() == "typed_parameter" { param.named_child(0) } else { Some(param) };
                match inner.map(|node| node.kind()) {
                    Some("list_splat_pattern") => keyword_only = true,
                    Some("dictionary_splat_pattern") => {}
                    _ if seen_default && !keyword_only => {
                        return Some(Rejection::at(param, "non-default argument follows default argument"));
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
    None
}
