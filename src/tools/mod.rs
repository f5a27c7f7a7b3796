//! Tool name classification
//!
//! Policies and event payloads carry a coarse [`ToolCategory`] derived from
//! the tool name. The heuristics live in [`category`].

mod category;

pub use category::{categorize, ToolCategory};
