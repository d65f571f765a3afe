//! Best-effort CSS selector generation for a node.
//!
//! Used when synthesizing pseudo-element rules during clone preparation. The
//! output favors stability over uniqueness: an id wins, then tag plus class
//! list, then a positional `:nth-child()` fallback.

use super::node::{Document, NodeId};

/// Escapes a CSS identifier by backslash-prefixing ASCII punctuation and
/// spaces, mirroring the conservative fallback hosts use when a native
/// escaper is unavailable.
pub fn css_escape(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for ch in ident.chars() {
        if matches!(
            ch,
            ' ' | '!' | '"' | '#' | '$' | '%' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | '.'
                | '/' | ':' | ';' | '<' | '=' | '>' | '?' | '@' | '[' | '\\' | ']' | '^' | '`'
                | '{' | '|' | '}' | '~'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Generates a selector for `id`, preferring `#id`, then `tag.class1.class2`,
/// then `tag:nth-child(n)` with a 1-based sibling index.
pub fn element_selector(doc: &Document, id: NodeId) -> String {
    let node = doc.node(id);

    if let Some(element_id) = node.id.as_deref() {
        if !element_id.is_empty() {
            return format!("#{}", css_escape(element_id));
        }
    }

    let tag = node.tag.to_ascii_lowercase();
    let class_selector: String = node
        .classes
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| format!(".{}", css_escape(c)))
        .collect();
    if !class_selector.is_empty() {
        return format!("{tag}{class_selector}");
    }

    format!("{}:nth-child({})", tag, doc.nth_child_index(id))
}
