//! Event system
//!
//! A typed publish/subscribe hub for agent lifecycle events. The
//! [`HookBridge`](crate::bridge::HookBridge) emits one [`AgentEvent`] per
//! host lifecycle callback; observers subscribe by event type, by category
//! prefix, or globally, and each returns a [`HandlerResult`] the bridge
//! reduces into the host's control decision.
//!
//! # Example
//!
//! ```ignore
//! use agent_gatekeeper::events::{EventRegistry, EventType, HandlerResult};
//!
//! let registry = EventRegistry::new();
//!
//! // Audit every tool event
//! registry.on_category_fn("tool", |event| async move {
//!     tracing::info!(event_type = %event.event_type, "tool activity");
//!     Ok(HandlerResult::none())
//! });
//!
//! // Block a specific tool before it runs
//! registry.on_fn(EventType::ToolBegin, |event| async move {
//!     match event.payload.as_tool() {
//!         Some(tool) if tool.tool_name == "Bash" => {
//!             Ok(HandlerResult::deny("shell disabled"))
//!         }
//!         _ => Ok(HandlerResult::none()),
//!     }
//! });
//! ```

mod registry;
mod types;

pub use registry::{EventRegistry, ListenerId};
pub use types::{
    AgentEvent, DelegationPayload, EventHandler, EventPayload, EventType, HandlerAction,
    HandlerResult, SessionPayload, SystemPayload, ToolPayload, ToolStatus, UserInputPayload,
};
