//! Hook bridging
//!
//! The host agent runtime exposes a fixed set of lifecycle callback slots
//! (PreToolUse, PostToolUse, SessionStart, ...). The [`HookBridge`] fills
//! those slots: it normalizes each raw callback input into a typed event,
//! emits it through the [`EventRegistry`](crate::events::EventRegistry), and
//! reduces the handlers' results into the control object the host expects.
//!
//! # Example
//!
//! ```ignore
//! use agent_gatekeeper::bridge::{HookBridge, HookInput};
//! use agent_gatekeeper::events::EventRegistry;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(EventRegistry::new());
//! let bridge = HookBridge::new(registry.clone(), "my-agent");
//!
//! // Wire each bridge method into the matching host hook slot, e.g.:
//! let input: HookInput = serde_json::from_value(raw_hook_input)?;
//! let control = bridge.pre_tool_use(&input).await;
//! respond_to_host(serde_json::to_value(&control)?);
//! ```

#[allow(clippy::module_inception)]
mod bridge;
mod payloads;

pub use bridge::{HookBridge, HookDecisionOutput, HookKind, HookOutput};
pub use payloads::{
    build_compact_payload, build_delegation_payload, build_permission_payload,
    build_session_end_payload, build_session_start_payload, build_system_payload,
    build_tool_begin_payload, build_tool_complete_payload, build_tool_error_payload,
    build_user_input_payload, HookInput,
};
