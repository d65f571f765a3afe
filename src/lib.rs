//! Library exports for embedding the element screenshot engine.
//!
//! Exposes the document model, picker session, capture pipeline, messaging
//! surface, and preference handling so that hosts (browser shims, CLIs,
//! test harnesses) can drive captures without going through the binary.

pub mod capture;
pub mod config;
pub mod dom;
pub mod messaging;
pub mod picker;

pub use config::Preferences;
