//! Element picker: overlay UI and the interactive selection session.

pub mod overlay;
pub mod session;

#[cfg(test)]
mod tests;

pub use overlay::{HIGHLIGHT_CLASS, INDICATOR_ATTR, INDICATOR_CLASS, OVERLAY_ID};
pub use session::{FeedbackLinger, SelectorSession};
