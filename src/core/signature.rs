//! Canonical signature strings for Python functions and methods.
//!
//! Parameters render as `(a, b: int = 1, /, c=2, *args: str, kw: bool = False, **rest) -> R`.
//! Annotations and defaults are the source text of the expression with
//! layout whitespace normalized; nothing is evaluated.

use std::fmt;

use thiserror::Error;
use tree_sitter::Node;
use tracing::debug;

use super::syntax::{FunctionNode, ParamNode};

/// Text used for a default value that could not be reconstructed
pub const DEFAULT_PLACEHOLDER: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Positional,
    PositionalWithDefault,
    KeywordOnly,
    VarPositional,
    VarKeyword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamKind,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

/// A piece of a declaration that could not be turned back into text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot render `{kind}` node at line {line}, column {column}")]
pub struct RenderFallback {
    pub kind: &'static str,
    pub line: usize,
    pub column: usize,
}

impl RenderFallback {
    fn at(node: Node) -> Self {
        let pos = node.start_position();
        Self {
            kind: node.kind(),
            line: pos.row + 1,
            column: pos.column + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Parameter>,
    positional_only: usize,
    returns: Option<String>,
    is_async: bool,
}

impl Signature {
    /// Build the signature of a lowered function node.
    ///
    /// Unrenderable pieces are dropped or replaced by [`DEFAULT_PLACEHOLDER`];
    /// this never fails as a whole.
    pub fn from_function(func: &FunctionNode<'_>, source: &[u8]) -> Self {
        let mut params = Vec::with_capacity(func.params.len());
        let mut positional_only = 0;
        let mut keyword_only = false;

        for param in &func.params {
            match param {
                ParamNode::Named { name, annotation, default } => {
                    let name = match render_expression(*name, source) {
                        Ok(name) => name,
                        Err(fallback) => {
                            debug!(function = %func.name, "Dropping parameter: {}", fallback);
                            continue;
                        }
                    };
                    let annotation = annotation.and_then(|node| render_optional(node, source, &func.name));
                    let default = default.map(|node| {
                        render_expression(node, source).unwrap_or_else(|fallback| {
                            debug!(function = %func.name, "Default replaced by placeholder: {}", fallback);
                            DEFAULT_PLACEHOLDER.to_string()
                        })
                    });
                    let kind = if keyword_only {
                        ParamKind::KeywordOnly
                    } else if default.is_some() {
                        ParamKind::PositionalWithDefault
                    } else {
                        ParamKind::Positional
                    };
                    params.push(Parameter { name, kind, annotation, default });
                }
                ParamNode::ListSplat { name, annotation } => {
                    keyword_only = true;
                    if let Some(parameter) = collector(*name, *annotation, ParamKind::VarPositional, source, &func.name) {
                        params.push(parameter);
                    }
                }
                ParamNode::DictSplat { name, annotation } => {
                    if let Some(parameter) = collector(*name, *annotation, ParamKind::VarKeyword, source, &func.name) {
                        params.push(parameter);
                    }
                }
                ParamNode::KeywordSeparator => keyword_only = true,
                ParamNode::PositionalSeparator => {
                    positional_only = params.iter().filter(|p| p.is_positional()).count();
                }
                ParamNode::Unsupported(node) => {
                    debug!(function = %func.name, "Dropping parameter: {}", RenderFallback::at(*node));
                }
            }
        }

        let returns = func.return_type.and_then(|node| render_optional(node, source, &func.name));

        Self {
            params,
            positional_only,
            returns,
            is_async: func.is_async,
        }
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Canonical text form; kinds always come out in Python's legal order
    pub fn render(&self) -> String {
        let of_kind = |kind: ParamKind| self.params.iter().filter(move |p| p.kind == kind);

        let mut parts: Vec<String> = Vec::with_capacity(self.params.len() + 2);

        let positional: Vec<&Parameter> = self.params.iter().filter(|p| p.is_positional()).collect();
        for (index, param) in positional.iter().enumerate() {
            parts.push(param.render());
            if self.positional_only > 0 && index + 1 == self.positional_only {
                parts.push("/".to_string());
            }
        }

        let mut var_positional = of_kind(ParamKind::VarPositional).peekable();
        let has_keyword_only = of_kind(ParamKind::KeywordOnly).next().is_some();
        if var_positional.peek().is_some() {
            parts.extend(var_positional.map(Parameter::render));
        } else if has_keyword_only {
            parts.push("*".to_string());
        }

        parts.extend(of_kind(ParamKind::KeywordOnly).map(Parameter::render));
        parts.extend(of_kind(ParamKind::VarKeyword).map(Parameter::render));

        let mut rendered = format!("({})", parts.join(", "));
        if let Some(returns) = &self.returns {
            rendered.push_str(" -> ");
            rendered.push_str(returns);
        }
        rendered
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Parameter {
    fn is_positional(&self) -> bool {
        matches!(self.kind, ParamKind::Positional | ParamKind::PositionalWithDefault)
    }

    fn render(&self) -> String {
        let prefix = match self.kind {
            ParamKind::VarPositional => "*",
            ParamKind::VarKeyword => "**",
            _ => "",
        };
        let mut out = format!("{}{}", prefix, self.name);
        if let Some(annotation) = &self.annotation {
            out.push_str(": ");
            out.push_str(annotation);
        }
        if let Some(default) = &self.default {
            // PEP 8 spacing: `a=1` but `a: int = 1`
            out.push_str(if self.annotation.is_some() { " = " } else { "=" });
            out.push_str(default);
        }
        out
    }
}

fn collector(
    name: Node,
    annotation: Option<Node>,
    kind: ParamKind,
    source: &[u8],
    function: &str,
) -> Option<Parameter> {
    let name = match render_expression(name, source) {
        Ok(name) => name,
        Err(fallback) => {
            debug!(function = %function, "Dropping collector: {}", fallback);
            return None;
        }
    };
    Some(Parameter {
        name,
        kind,
        annotation: annotation.and_then(|node| render_optional(node, source, function)),
        default: None,
    })
}

/// Render an annotation-like piece; a failure omits it
fn render_optional(node: Node, source: &[u8], function: &str) -> Option<String> {
    match render_expression(node, source) {
        Ok(text) => Some(text),
        Err(fallback) => {
            debug!(function = %function, "Omitting annotation: {}", fallback);
            None
        }
    }
}

/// Reconstruct the source text of an expression.
///
/// Tokens are re-joined from the tree: comments are dropped, line breaks
/// inside brackets disappear, and runs of spaces collapse to one. String
/// literals are copied verbatim.
pub fn render_expression(node: Node, source: &[u8]) -> Result<String, RenderFallback> {
    if node.is_error() || node.is_missing() || node.has_error() {
        return Err(RenderFallback::at(node));
    }

    let tokens = collect_tokens(node);

    let mut out = String::new();
    let mut previous: Option<(Node, &str)> = None;
    for token in tokens {
        let text = token.utf8_text(source).map_err(|_| RenderFallback::at(token))?;
        if let Some((prev, prev_text)) = previous {
            let gap = source.get(prev.end_byte()..token.start_byte()).unwrap_or_default();
            if !gap.is_empty() {
                let spans_lines = gap.iter().any(|b| *b == b'\n' || *b == b'\\');
                let hugs_bracket = matches!(prev_text, "(" | "[" | "{")
                    || matches!(text, ")" | "]" | "}" | ",");
                if !(spans_lines && hugs_bracket) {
                    out.push(' ');
                }
            }
        }
        out.push_str(text);
        previous = Some((token, text));
    }

    if out.is_empty() {
        return Err(RenderFallback::at(node));
    }
    Ok(out)
}

/// Leaf tokens under `node` in document order, with strings kept whole
fn collect_tokens<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut tokens = Vec::new();
    let mut cursor = node.walk();

    loop {
        let current = cursor.node();
        let descend = match current.kind() {
            "comment" => false,
            "string" => {
                tokens.push(current);
                false
            }
            _ if current.child_count() == 0 => {
                tokens.push(current);
                false
            }
            _ => true,
        };
        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node() == node {
                return tokens;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return tokens;
            }
        }
    }
}
