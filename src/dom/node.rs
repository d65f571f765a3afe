//! In-memory renderable-node tree.
//!
//! The capture pipeline never talks to a real browser DOM; it operates on this
//! arena-backed document model. Hosts feed it from a serialized page snapshot
//! (JSON), and the rasterizer seam receives clones of it. Nodes expose exactly
//! what the pipeline needs: children, computed styles, inline styles, pseudo
//! element styles, and scroll/client geometry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Handle to a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Viewport-relative bounding box, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Layout metrics mirroring the client/scroll dimension split of a live DOM
/// element. `scroll_*` exceeding `client_*` means the element clips content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub client_width: u32,
    #[serde(default)]
    pub client_height: u32,
    #[serde(default)]
    pub scroll_width: u32,
    #[serde(default)]
    pub scroll_height: u32,
    #[serde(default, skip_serializing_if = "rect_is_zero")]
    pub rect: RectWrapper,
}

// Geometry keeps Eq for cheap comparisons in tests; the float rect lives in a
// wrapper that opts out of the Eq bound.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RectWrapper(pub Rect);

impl Eq for RectWrapper {}

fn rect_is_zero(r: &RectWrapper) -> bool {
    r.0 == Rect::default()
}

impl Geometry {
    pub fn rect(&self) -> Rect {
        self.rect.0
    }

    pub fn has_vertical_overflow(&self) -> bool {
        self.scroll_height > self.client_height
    }

    pub fn has_horizontal_overflow(&self) -> bool {
        self.scroll_width > self.client_width
    }
}

/// One inline style declaration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleValue {
    pub value: String,
    #[serde(default)]
    pub important: bool,
}

impl StyleValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            important: false,
        }
    }

    pub fn important(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            important: true,
        }
    }
}

/// A stylesheet attached to the document head.
///
/// `Inline { rules: None, .. }` models the cross-origin case where rule
/// enumeration is blocked and only the raw text content is readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stylesheet {
    External {
        href: String,
    },
    Inline {
        #[serde(default)]
        rules: Option<Vec<String>>,
        #[serde(default)]
        raw_text: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_style: BTreeMap<String, StyleValue>,
    /// Resolved style properties, as a `getComputedStyle` stand-in.
    #[serde(default)]
    pub computed: BTreeMap<String, String>,
    /// Computed styles of pseudo elements, keyed by `::before` / `::after`.
    #[serde(default)]
    pub pseudo: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(skip)]
    pub(crate) children: Vec<NodeId>,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    #[serde(skip)]
    pub(crate) detached: bool,
}

impl Node {
    fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }
}

/// Nested node description used by the page snapshot format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_style: BTreeMap<String, StyleValue>,
    #[serde(default)]
    pub computed: BTreeMap<String, String>,
    #[serde(default)]
    pub pseudo: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn default_dpr() -> f32 {
    1.0
}

/// Serialized page snapshot a host hands to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub root: NodeSpec,
    #[serde(default)]
    pub stylesheets: Vec<Stylesheet>,
    #[serde(default = "default_dpr")]
    pub device_pixel_ratio: f32,
}

/// Arena-backed document tree plus head stylesheets.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    stylesheets: Vec<Stylesheet>,
    device_pixel_ratio: f32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document with a `body` root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::with_tag("body")],
            root: NodeId(0),
            stylesheets: Vec::new(),
            device_pixel_ratio: 1.0,
        }
    }

    /// Builds a document from a deserialized page snapshot.
    pub fn from_snapshot(snapshot: PageSnapshot) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            stylesheets: snapshot.stylesheets,
            device_pixel_ratio: snapshot.device_pixel_ratio,
        };
        let root = doc.insert_spec(&snapshot.root, None);
        doc.root = root;
        doc
    }

    /// Parses a JSON page snapshot.
    pub fn from_snapshot_json(json: &str) -> Result<Self, serde_json::Error> {
        let snapshot: PageSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    fn insert_spec(&mut self, spec: &NodeSpec, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: spec.tag.clone(),
            id: spec.id.clone(),
            classes: spec.classes.clone(),
            attributes: spec.attributes.clone(),
            text: spec.text.clone(),
            inline_style: spec.inline_style.clone(),
            computed: spec.computed.clone(),
            pseudo: spec.pseudo.clone(),
            geometry: spec.geometry,
            children: Vec::new(),
            parent,
            detached: false,
        });
        for child in &spec.children {
            let child_id = self.insert_spec(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::with_tag(tag);
        node.detached = true;
        self.nodes.push(node);
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].detached = false;
        self.nodes[parent.0].children.push(child);
    }

    /// Detaches a node from its parent. The arena slot stays allocated; the
    /// node is simply unreachable from the root afterwards.
    pub fn remove_node(&mut self, id: NodeId) {
        self.detach(id);
        self.nodes[id.0].detached = true;
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        !self.nodes[id.0].detached
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// 1-based position among the parent's children, as used by
    /// `:nth-child()` selectors. Roots count as the first child.
    pub fn nth_child_index(&self, id: NodeId) -> usize {
        match self.parent(id) {
            Some(parent) => {
                self.children(parent)
                    .iter()
                    .position(|&c| c == id)
                    .unwrap_or(0)
                    + 1
            }
            None => 1,
        }
    }

    /// Depth-first traversal of a subtree, including `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Walks up from `id` looking for an ancestor (or `id` itself) that
    /// satisfies the predicate, like `Element.closest`.
    pub fn closest(&self, id: NodeId, predicate: impl Fn(&Node) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if predicate(self.node(node_id)) {
                return Some(node_id);
            }
            current = self.parent(node_id);
        }
        None
    }

    pub fn find_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.node(n).id.as_deref() == Some(element_id))
    }

    pub fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.node(n).tag.eq_ignore_ascii_case(tag))
    }

    /// All attached nodes carrying the given attribute.
    pub fn nodes_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&n| self.node(n).attributes.contains_key(name))
            .collect()
    }

    // --- class helpers ---

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            self.node_mut(id).classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.node_mut(id).classes.retain(|c| c != class);
    }

    // --- style helpers ---

    pub fn computed_style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.node(id).computed.get(property).map(String::as_str)
    }

    pub fn pseudo_style(&self, id: NodeId, pseudo: &str, property: &str) -> Option<&str> {
        self.node(id)
            .pseudo
            .get(pseudo)
            .and_then(|props| props.get(property))
            .map(String::as_str)
    }

    pub fn inline_style(&self, id: NodeId, property: &str) -> Option<&StyleValue> {
        self.node(id).inline_style.get(property)
    }

    pub fn set_inline_style(&mut self, id: NodeId, property: &str, value: StyleValue) {
        self.node_mut(id)
            .inline_style
            .insert(property.to_string(), value);
    }

    /// Sets or clears an inline style property; clearing matches restoring a
    /// snapshot entry that was absent before the capture mutated it.
    pub fn set_or_clear_inline_style(
        &mut self,
        id: NodeId,
        property: &str,
        value: Option<StyleValue>,
    ) {
        match value {
            Some(v) => self.set_inline_style(id, property, v),
            None => {
                self.node_mut(id).inline_style.remove(property);
            }
        }
    }

    // --- attribute helpers ---

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        self.node_mut(id)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.node_mut(id).text = Some(text.into());
    }

    // --- stylesheets ---

    pub fn stylesheets(&self) -> &[Stylesheet] {
        &self.stylesheets
    }

    pub fn push_stylesheet(&mut self, sheet: Stylesheet) {
        self.stylesheets.push(sheet);
    }

    pub fn clear_stylesheets(&mut self) {
        self.stylesheets.clear();
    }
}
