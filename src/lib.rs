//! Agent-action governance core
//!
//! Intercepts every tool invocation, session transition, and permission
//! request an autonomous coding agent attempts, normalizes it into a typed
//! event, and decides - via a declarative policy - whether to allow, deny,
//! or defer to a human.
//!
//! The pieces compose bottom-up:
//!
//! - [`tools`] categorizes tool names
//! - [`events`] is the typed publish/subscribe hub
//! - [`policy`] holds the declarative ruleset, evaluator, built-in risk
//!   heuristics, and the ask/timeout orchestration
//! - [`bridge`] adapts the host runtime's hook callbacks into events and
//!   reduces handler results back into host control objects
//!
//! The host runtime and any approval UI stay outside this crate; they talk
//! to it only through the bridge methods, the registry subscription surface,
//! and the ask/decision callbacks.

pub mod core;
pub mod events;
pub mod policy;
pub mod tools;

// Host-facing adaptation layer
pub mod bridge;

// Optional tracing-subscriber setup for embedders without their own
pub mod logging;

pub use crate::core::{GateError, GateResult};
pub use bridge::{HookBridge, HookInput, HookKind, HookOutput};
pub use events::{AgentEvent, EventRegistry, EventType, HandlerAction, HandlerResult};
pub use policy::{
    command_risk_assessment, evaluate, merge_policies, DecidedBy, PermissionAction,
    PermissionHandler, PermissionPayload, PermissionPolicy, PermissionVerdict, RiskAssessment,
    RiskLevel,
};
pub use tools::{categorize, ToolCategory};
