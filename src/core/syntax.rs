//! Typed view over the tree-sitter Python grammar.
//!
//! Everything downstream matches on these enums instead of raw node-kind
//! strings. Only the node kinds the extractor cares about get a variant;
//! the rest collapse into `Statement::Other` or `ParamNode::Unsupported`.

use tree_sitter::Node;

/// A statement in a module or class body
#[derive(Debug)]
pub enum Statement<'t> {
    Function(FunctionNode<'t>),
    Class(ClassNode<'t>),
    Other,
}

/// A `def` or `async def`, decorators already stripped
#[derive(Debug)]
pub struct FunctionNode<'t> {
    pub name: String,
    pub is_async: bool,
    pub params: Vec<ParamNode<'t>>,
    pub return_type: Option<Node<'t>>,
    pub body: Option<Node<'t>>,
}

#[derive(Debug)]
pub struct ClassNode<'t> {
    pub name: String,
    pub body: Option<Node<'t>>,
}

/// One entry of a `parameters` list
#[derive(Debug)]
pub enum ParamNode<'t> {
    /// `a`, `a: T`, `a=d` or `a: T = d`
    Named {
        name: Node<'t>,
        annotation: Option<Node<'t>>,
        default: Option<Node<'t>>,
    },
    /// `*args`, optionally annotated
    ListSplat {
        name: Node<'t>,
        annotation: Option<Node<'t>>,
    },
    /// `**kwargs`, optionally annotated
    DictSplat {
        name: Node<'t>,
        annotation: Option<Node<'t>>,
    },
    /// Bare `*`
    KeywordSeparator,
    /// `/`
    PositionalSeparator,
    Unsupported(Node<'t>),
}

/// Lower the direct statements of a module or a class body.
pub fn body_statements<'t>(body: Node<'t>, source: &[u8]) -> Vec<Statement<'t>> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| lower_statement(child, source))
        .collect()
}

fn lower_statement<'t>(node: Node<'t>, source: &[u8]) -> Statement<'t> {
    match node.kind() {
        "function_definition" => lower_function(node, source)
            .map(Statement::Function)
            .unwrap_or(Statement::Other),
        "class_definition" => lower_class(node, source)
            .map(Statement::Class)
            .unwrap_or(Statement::Other),
        "decorated_definition" => match node.child_by_field_name("definition") {
            Some(definition) => lower_statement(definition, source),
            None => Statement::Other,
        },
        _ => Statement::Other,
    }
}

fn lower_function<'t>(node: Node<'t>, source: &[u8]) -> Option<FunctionNode<'t>> {
    let name = identifier_text(node.child_by_field_name("name")?, source)?;

    let mut cursor = node.walk();
    let is_async = node.children(&mut cursor)
        .take_while(|child| child.kind() != "def")
        .any(|child| child.kind() == "async");

    let params = node.child_by_field_name("parameters")
        .map(|params| lower_parameters(params))
        .unwrap_or_default();

    Some(FunctionNode {
        name,
        is_async,
        params,
        return_type: node.child_by_field_name("return_type"),
        body: node.child_by_field_name("body"),
    })
}

fn lower_class<'t>(node: Node<'t>, source: &[u8]) -> Option<ClassNode<'t>> {
    let name = identifier_text(node.child_by_field_name("name")?, source)?;
    Some(ClassNode {
        name,
        body: node.child_by_field_name("body"),
    })
}

fn lower_parameters(params: Node<'_>) -> Vec<ParamNode<'_>> {
    let mut cursor = params.walk();
    params.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(lower_parameter)
        .collect()
}

fn lower_parameter(node: Node<'_>) -> ParamNode<'_> {
    match node.kind() {
        "identifier" | "keyword_identifier" => ParamNode::Named {
            name: node,
            annotation: None,
            default: None,
        },
        "typed_parameter" => {
            let annotation = node.child_by_field_name("type");
            // The name is the first named child; it may itself be a splat pattern
            let Some(inner) = node.named_child(0) else {
                return ParamNode::Unsupported(node);
            };
            match inner.kind() {
                "identifier" | "keyword_identifier" => ParamNode::Named {
                    name: inner,
                    annotation,
                    default: None,
                },
                "list_splat_pattern" => match splat_name(inner) {
                    Some(name) => ParamNode::ListSplat { name, annotation },
                    None => ParamNode::Unsupported(node),
                },
                "dictionary_splat_pattern" => match splat_name(inner) {
                    Some(name) => ParamNode::DictSplat { name, annotation },
                    None => ParamNode::Unsupported(node),
                },
                _ => ParamNode::Unsupported(node),
            }
        }
        "default_parameter" | "typed_default_parameter" => {
            match (node.child_by_field_name("name"), node.child_by_field_name("value")) {
                (Some(name), Some(value)) if is_identifier(name) => ParamNode::Named {
                    name,
                    annotation: node.child_by_field_name("type"),
                    default: Some(value),
                },
                _ => ParamNode::Unsupported(node),
            }
        }
        "list_splat_pattern" => match splat_name(node) {
            Some(name) => ParamNode::ListSplat { name, annotation: None },
            None => ParamNode::Unsupported(node),
        },
        "dictionary_splat_pattern" => match splat_name(node) {
            Some(name) => ParamNode::DictSplat { name, annotation: None },
            None => ParamNode::Unsupported(node),
        },
        "keyword_separator" => ParamNode::KeywordSeparator,
        "positional_separator" => ParamNode::PositionalSeparator,
        _ => ParamNode::Unsupported(node),
    }
}

fn splat_name(pattern: Node<'_>) -> Option<Node<'_>> {
    pattern.named_child(0).filter(|inner| is_identifier(*inner))
}

fn is_identifier(node: Node) -> bool {
    matches!(node.kind(), "identifier" | "keyword_identifier")
}

fn identifier_text(node: Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source).ok().map(|s| s.to_string())
}

/// The string literal node forming a body's docstring, if any.
///
/// Only a string expression as the first statement qualifies; redundant
/// parentheses around it are allowed.
pub fn docstring_node<'t>(body: Node<'t>) -> Option<Node<'t>> {
    let first = first_named(body)?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let mut expr = first_named(first)?;
    while expr.kind() == "parenthesized_expression" {
        expr = first_named(expr)?;
    }

    matches!(expr.kind(), "string" | "concatenated_string").then_some(expr)
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let first = node.named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    first
}
