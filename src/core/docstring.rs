//! Docstring extraction: literal decoding plus `inspect.cleandoc`-style
//! indentation cleanup.

use tree_sitter::Node;

use super::syntax;

/// Cleaned docstring of a function or class body.
///
/// f-strings and bytes literals never count as docstrings.
pub fn extract(body: Node, source: &[u8]) -> Option<String> {
    let literal = syntax::docstring_node(body)?;
    let raw = match literal.kind() {
        "concatenated_string" => {
            let mut cursor = literal.walk();
            let mut value = String::new();
            for part in literal.named_children(&mut cursor) {
                if part.kind() == "string" {
                    value.push_str(&literal_value(part.utf8_text(source).ok()?)?);
                }
            }
            value
        }
        _ => literal_value(literal.utf8_text(source).ok()?)?,
    };
    Some(clean(&raw))
}

/// Value of a single Python string literal, or `None` for f/bytes literals.
fn literal_value(text: &str) -> Option<String> {
    let prefix_len = text.find(|c| c == '"' || c == '\'')?;
    let prefix = text[..prefix_len].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let quoted = &text[prefix_len..];
    let quote = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|q| quoted.starts_with(q) && quoted.len() >= 2 * q.len() && quoted.ends_with(q))?;
    let inner = &quoted[quote.len()..quoted.len() - quote.len()];

    if prefix.contains('r') {
        Some(inner.to_string())
    } else {
        Some(unescape(inner))
    }
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.clone().take(width).collect();
                let decoded = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        out.push(ch);
                        for _ in 0..width {
                            chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            // Unknown escapes stay as written
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

/// Same normalization as Python's `inspect.cleandoc`
pub fn clean(doc: &str) -> String {
    let expanded: Vec<String> = doc.split('\n').map(expand_tabs).collect();

    let margin = expanded
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start();
            (!content.is_empty()).then(|| line.chars().count() - content.chars().count())
        })
        .min();

    let mut lines: Vec<String> = Vec::with_capacity(expanded.len());
    for (i, line) in expanded.iter().enumerate() {
        if i == 0 {
            lines.push(line.trim_start().to_string());
        } else {
            let cut = margin.unwrap_or(0);
            lines.push(line.chars().skip(cut).collect());
        }
    }

    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = 8 - column % 8;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}
