//! Document model the capture engine operates on.

pub mod node;
pub mod selector;

pub use node::{
    Document, Geometry, Node, NodeId, NodeSpec, PageSnapshot, Rect, StyleValue, Stylesheet,
};
pub use selector::{css_escape, element_selector};
