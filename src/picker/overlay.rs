//! Overlay UI pieces installed into the document during a picking session.
//!
//! Overlay structure is intentionally minimal and tagged so every piece can
//! be found and removed: the overlay root by a well-known element id,
//! highlights by a class, scrollable indicators by a data attribute.

use crate::dom::{Document, NodeId, Rect};

pub const OVERLAY_ID: &str = "screenshot-selector-overlay";
pub const HIGHLIGHT_CLASS: &str = "screenshot-highlight";
pub const INDICATOR_CLASS: &str = "screenshot-scrollable-indicator";
pub const INDICATOR_ATTR: &str = "data-screenshot-indicator";

/// Handle to the installed overlay root.
#[derive(Debug, Clone, Copy)]
pub struct OverlayUi {
    pub overlay: NodeId,
    status: NodeId,
}

impl OverlayUi {
    /// Installs the overlay with its initial instruction text.
    pub fn install(doc: &mut Document) -> Self {
        let overlay = doc.create_element("div");
        doc.node_mut(overlay).id = Some(OVERLAY_ID.to_string());
        let status = doc.create_element("span");
        doc.set_text(status, "Hover over elements and click to capture");
        doc.append_child(overlay, status);
        doc.append_child(doc.root(), overlay);
        Self { overlay, status }
    }

    pub fn set_status(&self, doc: &mut Document, message: &str) {
        doc.set_text(self.status, message);
    }

    pub fn remove(self, doc: &mut Document) {
        doc.remove_node(self.overlay);
    }
}

/// True when `node` sits inside the overlay UI; such nodes are never valid
/// pick targets.
pub fn is_within_overlay(doc: &Document, node: NodeId) -> bool {
    doc.closest(node, |n| n.id.as_deref() == Some(OVERLAY_ID))
        .is_some()
}

pub fn highlight(doc: &mut Document, node: NodeId) {
    doc.add_class(node, HIGHLIGHT_CLASS);
}

pub fn unhighlight(doc: &mut Document, node: NodeId) {
    doc.remove_class(node, HIGHLIGHT_CLASS);
}

/// Annotates a hovered element whose content overflows its visible box.
///
/// Adds an outline sized to the full scrollable extent plus a label naming
/// the full and visible dimensions per overflowing axis. No-op for elements
/// without overflow.
pub fn add_scrollable_indicators(doc: &mut Document, target: NodeId) {
    let geometry = doc.node(target).geometry;
    let vertical = geometry.has_vertical_overflow();
    let horizontal = geometry.has_horizontal_overflow();
    if !vertical && !horizontal {
        return;
    }

    let rect = geometry.rect();
    let indicator = doc.create_element("div");
    doc.add_class(indicator, INDICATOR_CLASS);
    doc.set_attribute(indicator, INDICATOR_ATTR, "true");
    doc.node_mut(indicator).geometry.rect.0 = Rect {
        left: rect.left,
        top: rect.top,
        width: if horizontal {
            geometry.scroll_width as f64
        } else {
            rect.width
        },
        height: if vertical {
            geometry.scroll_height as f64
        } else {
            rect.height
        },
    };
    doc.append_child(doc.root(), indicator);

    let mut scroll_info = Vec::new();
    if vertical {
        scroll_info.push(format!(
            "H: {}px (visible: {}px)",
            geometry.scroll_height, geometry.client_height
        ));
    }
    if horizontal {
        scroll_info.push(format!(
            "W: {}px (visible: {}px)",
            geometry.scroll_width, geometry.client_width
        ));
    }

    let label = doc.create_element("div");
    doc.set_attribute(label, INDICATOR_ATTR, "true");
    doc.set_text(label, format!("Full content - {}", scroll_info.join(", ")));
    doc.node_mut(label).geometry.rect.0 = Rect {
        left: rect.left,
        top: rect.top - 25.0,
        ..Rect::default()
    };
    doc.append_child(doc.root(), label);
}

/// Removes every node tagged as a scrollable indicator.
pub fn remove_scrollable_indicators(doc: &mut Document) {
    for node in doc.nodes_with_attribute(INDICATOR_ATTR) {
        doc.remove_node(node);
    }
}
