//! Clone preparation for the rasterizer's document copy.
//!
//! Rendering happens on a clone, and clones lose context the live document
//! had: attached stylesheets, cascade results, and pseudo-element content.
//! This module rebuilds enough of that context for the clone to paint like
//! the original: stylesheets are re-attached, the target subtree's computed
//! styles are burned in as `!important` inline declarations, and pseudo
//! elements with content get synthesized rules.

use crate::dom::{element_selector, Document, NodeId, StyleValue, Stylesheet};

/// Computed properties burned into the clone, covering typography, color,
/// layout, flex/grid, and visual effects.
const COPIED_STYLE_PROPERTIES: &[&str] = &[
    // Typography and fonts
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "font-variant",
    "text-align",
    "text-decoration",
    "text-transform",
    "text-indent",
    "line-height",
    "letter-spacing",
    "word-spacing",
    "white-space",
    // Colors and backgrounds
    "color",
    "background-color",
    "background-image",
    "background-size",
    "background-position",
    "background-repeat",
    "background-attachment",
    // Layout and positioning
    "display",
    "position",
    "top",
    "left",
    "right",
    "bottom",
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "margin",
    "padding",
    "border",
    "border-radius",
    "float",
    "clear",
    "vertical-align",
    // Flexbox and grid
    "flex",
    "flex-direction",
    "flex-wrap",
    "flex-basis",
    "flex-grow",
    "flex-shrink",
    "justify-content",
    "align-items",
    "align-self",
    "align-content",
    "grid",
    "grid-template",
    "grid-area",
    "grid-column",
    "grid-row",
    // Visual effects
    "opacity",
    "visibility",
    "overflow",
    "overflow-x",
    "overflow-y",
    "box-shadow",
    "text-shadow",
    "transform",
    "filter",
    "z-index",
    "cursor",
];

/// Subset preserved for `::before` / `::after`, which frequently carry icons.
const PSEUDO_PROPERTIES: &[&str] = &[
    "content",
    "display",
    "position",
    "top",
    "left",
    "right",
    "bottom",
    "width",
    "height",
    "font-family",
    "font-size",
    "color",
    "background-color",
    "background-image",
    "border",
    "border-radius",
    "transform",
    "opacity",
];

const PSEUDO_ELEMENTS: &[&str] = &["::before", "::after"];

fn is_skippable(value: &str) -> bool {
    matches!(value, "" | "none" | "normal" | "auto" | "initial")
}

/// Prepares the rasterizer's cloned document so it paints like the live one.
pub fn prepare_cloned_document(
    original: &Document,
    original_target: NodeId,
    clone: &mut Document,
    clone_target: NodeId,
) {
    reattach_stylesheets(original, clone);
    copy_computed_styles(original, original_target, clone, clone_target);
}

/// Re-attaches the live document's stylesheets to the clone. External sheets
/// are kept by reference; inline sheets prefer their enumerated rules and
/// fall back to raw text when rule access was blocked cross-origin.
pub fn reattach_stylesheets(original: &Document, clone: &mut Document) {
    clone.clear_stylesheets();
    for sheet in original.stylesheets() {
        match sheet {
            Stylesheet::External { href } => {
                clone.push_stylesheet(Stylesheet::External { href: href.clone() });
            }
            Stylesheet::Inline { rules, raw_text } => {
                let text = match rules {
                    Some(rules) => rules.join("\n"),
                    None => {
                        log::debug!("stylesheet rules blocked, falling back to raw text");
                        raw_text.clone()
                    }
                };
                clone.push_stylesheet(Stylesheet::Inline {
                    rules: None,
                    raw_text: text,
                });
            }
        }
    }
}

/// Burns the original subtree's computed styles into the clone's subtree as
/// `!important` inline declarations, walking both trees in paired order and
/// stopping at the shorter child list when they diverge.
pub fn copy_computed_styles(
    original: &Document,
    original_target: NodeId,
    clone: &mut Document,
    clone_target: NodeId,
) {
    let mut stack = vec![(original_target, clone_target)];
    while let Some((orig, cloned)) = stack.pop() {
        for &property in COPIED_STYLE_PROPERTIES {
            if let Some(value) = original.computed_style(orig, property) {
                if !is_skippable(value) {
                    clone.set_inline_style(cloned, property, StyleValue::important(value));
                }
            }
        }

        preserve_pseudo_elements(original, orig, clone, cloned);

        let orig_children: Vec<NodeId> = original.children(orig).to_vec();
        let clone_children: Vec<NodeId> = clone.children(cloned).to_vec();
        for pair in orig_children.into_iter().zip(clone_children) {
            stack.push(pair);
        }
    }
}

/// Synthesizes CSS rules for pseudo elements that carry content, attaching
/// them to the clone as inline stylesheets. Selectors are generated from the
/// cloned node so the rules resolve inside the clone.
fn preserve_pseudo_elements(
    original: &Document,
    orig: NodeId,
    clone: &mut Document,
    cloned: NodeId,
) {
    for &pseudo in PSEUDO_ELEMENTS {
        match original.pseudo_style(orig, pseudo, "content") {
            Some(c) if c != "none" && c != "\"\"" && !c.is_empty() => {}
            _ => continue,
        }

        let selector = element_selector(clone, cloned);
        let mut rule = format!("{selector}{pseudo} {{");
        for &property in PSEUDO_PROPERTIES {
            if let Some(value) = original.pseudo_style(orig, pseudo, property) {
                if !value.is_empty() && value != "none" && value != "normal" {
                    rule.push_str(&format!("{property}: {value} !important;"));
                }
            }
        }
        rule.push('}');

        clone.push_stylesheet(Stylesheet::Inline {
            rules: None,
            raw_text: rule,
        });
    }
}
