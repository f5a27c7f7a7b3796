//! Event Types
//!
//! Core types for the event system:
//! - `EventType` - closed enumeration of lifecycle event kinds
//! - `AgentEvent` - the immutable envelope handed to every handler
//! - `EventPayload` - kind-specific payload variants
//! - `HandlerResult` - what every handler returns
//! - `EventHandler` - async trait implemented by observers

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::policy::PermissionPayload;
use crate::tools::ToolCategory;

/// Lifecycle event kinds
///
/// The string form is `"<category>:<action>"`; the category prefix drives
/// [`EventRegistry::on_category`](crate::events::EventRegistry::on_category)
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A tool is about to execute
    #[serde(rename = "tool:begin")]
    ToolBegin,
    /// A tool finished successfully
    #[serde(rename = "tool:complete")]
    ToolComplete,
    /// A tool failed
    #[serde(rename = "tool:error")]
    ToolError,
    /// The user submitted a prompt
    #[serde(rename = "user_input:complete")]
    UserInputComplete,
    /// A session started
    #[serde(rename = "session:start")]
    SessionStart,
    /// A session ended
    #[serde(rename = "session:end")]
    SessionEnd,
    /// The main agent finished responding
    #[serde(rename = "agent:stop")]
    AgentStop,
    /// A subagent was spawned
    #[serde(rename = "delegation:start")]
    DelegationStart,
    /// A subagent finished
    #[serde(rename = "delegation:stop")]
    DelegationStop,
    /// The session context is about to be compacted
    #[serde(rename = "session:compact")]
    SessionCompact,
    /// The host is asking for a permission decision
    #[serde(rename = "permission:request")]
    PermissionRequest,
    /// Informational notification from the host
    #[serde(rename = "system:info")]
    SystemInfo,
}

impl EventType {
    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ToolBegin => "tool:begin",
            EventType::ToolComplete => "tool:complete",
            EventType::ToolError => "tool:error",
            EventType::UserInputComplete => "user_input:complete",
            EventType::SessionStart => "session:start",
            EventType::SessionEnd => "session:end",
            EventType::AgentStop => "agent:stop",
            EventType::DelegationStart => "delegation:start",
            EventType::DelegationStop => "delegation:stop",
            EventType::SessionCompact => "session:compact",
            EventType::PermissionRequest => "permission:request",
            EventType::SystemInfo => "system:info",
        }
    }

    /// Category prefix (the part before `:`)
    pub fn category(&self) -> &'static str {
        let s = self.as_str();
        match s.split_once(':') {
            Some((category, _)) => category,
            None => s,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Execution status carried on tool payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Pending,
    Success,
    Error,
}

/// Payload for tool begin/complete/error events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPayload {
    pub tool_name: String,
    pub category: ToolCategory,
    pub tool_use_id: Option<String>,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub status: ToolStatus,
    pub error: Option<String>,
}

/// Payload for user input events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInputPayload {
    pub prompt: Option<String>,
    pub cwd: Option<String>,
}

/// Payload for session start/end/stop/compact events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// How the session started (startup, resume, clear, ...)
    pub source: Option<String>,
    /// Why the session ended or stopped
    pub reason: Option<String>,
    /// What triggered a compaction (manual, auto)
    pub trigger: Option<String>,
    pub cwd: Option<String>,
    pub transcript_path: Option<String>,
}

/// Payload for subagent delegation events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelegationPayload {
    pub agent_id: Option<String>,
    pub agent_type: Option<String>,
    pub prompt: Option<String>,
}

/// Payload for system notifications
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemPayload {
    pub message: Option<String>,
}

/// Kind-specific event payload
///
/// Untagged: the envelope's `type` field already discriminates, so the
/// payload serializes as its bare shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Tool(ToolPayload),
    UserInput(UserInputPayload),
    Session(SessionPayload),
    Permission(PermissionPayload),
    Delegation(DelegationPayload),
    System(SystemPayload),
}

impl EventPayload {
    /// The permission payload, when this is a permission event
    pub fn as_permission(&self) -> Option<&PermissionPayload> {
        match self {
            EventPayload::Permission(p) => Some(p),
            _ => None,
        }
    }

    /// The tool payload, when this is a tool event
    pub fn as_tool(&self) -> Option<&ToolPayload> {
        match self {
            EventPayload::Tool(p) => Some(p),
            _ => None,
        }
    }
}

/// Immutable event envelope
///
/// Created exactly once per host callback, dispatched to zero or more
/// handlers, and dropped afterwards; the registry retains nothing.
#[derive(Debug, Clone, Serialize)]
pub struct AgentEvent {
    /// Unique per emission (uuid v4)
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Identifier of the emitting agent implementation
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: Option<String>,
    pub payload: EventPayload,
}

impl AgentEvent {
    /// Create an event with a fresh id and wall-clock timestamp
    pub fn new(
        event_type: EventType,
        agent: impl Into<String>,
        session_id: Option<String>,
        payload: EventPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type,
            agent: agent.into(),
            timestamp: Utc::now(),
            session_id,
            payload,
        }
    }
}

/// What a handler decided about an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerAction {
    /// Approve (meaningful for permission events)
    Allow,
    /// Block the action or stop the flow
    Deny,
    /// No opinion, continue normal flow
    Continue,
    /// Defer to a human (meaningful for permission events)
    Ask,
}

/// Result returned from every handler invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerResult {
    pub action: HandlerAction,
    /// Reason, surfaced as the denial/stop message
    pub message: Option<String>,
}

impl HandlerResult {
    /// Approve the action
    pub fn allow() -> Self {
        Self {
            action: HandlerAction::Allow,
            message: None,
        }
    }

    /// Block the action with a reason
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            action: HandlerAction::Deny,
            message: Some(reason.into()),
        }
    }

    /// Defer to a human
    pub fn ask() -> Self {
        Self {
            action: HandlerAction::Ask,
            message: None,
        }
    }

    /// No opinion - continue normal flow
    pub fn none() -> Self {
        Self {
            action: HandlerAction::Continue,
            message: None,
        }
    }

    /// Attach a message to an existing result
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Default for HandlerResult {
    fn default() -> Self {
        Self::none()
    }
}

/// Trait for event observers
///
/// Handlers run concurrently per event; a handler returning `Err` is logged
/// and its slot yields [`HandlerResult::none`], never aborting the dispatch.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle one event
    async fn handle(&self, event: Arc<AgentEvent>) -> Result<HandlerResult>;
}

/// Closure adapter so plain async closures can register as handlers
pub(crate) struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(Arc<AgentEvent>) -> BoxFuture<'static, Result<HandlerResult>> + Send + Sync,
{
    pub(crate) fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(Arc<AgentEvent>) -> BoxFuture<'static, Result<HandlerResult>> + Send + Sync,
{
    async fn handle(&self, event: Arc<AgentEvent>) -> Result<HandlerResult> {
        (self.f)(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_strings() {
        assert_eq!(EventType::ToolBegin.as_str(), "tool:begin");
        assert_eq!(EventType::PermissionRequest.as_str(), "permission:request");
        assert_eq!(EventType::UserInputComplete.as_str(), "user_input:complete");
    }

    #[test]
    fn test_event_type_category() {
        assert_eq!(EventType::ToolBegin.category(), "tool");
        assert_eq!(EventType::ToolError.category(), "tool");
        assert_eq!(EventType::SessionCompact.category(), "session");
        assert_eq!(EventType::SystemInfo.category(), "system");
    }

    #[test]
    fn test_agent_event_ids_are_unique() {
        let payload = || EventPayload::System(SystemPayload::default());
        let a = AgentEvent::new(EventType::SystemInfo, "test-agent", None, payload());
        let b = AgentEvent::new(EventType::SystemInfo, "test-agent", None, payload());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_handler_result_constructors() {
        assert_eq!(HandlerResult::allow().action, HandlerAction::Allow);
        assert_eq!(HandlerResult::none().action, HandlerAction::Continue);
        assert_eq!(HandlerResult::ask().action, HandlerAction::Ask);

        let denied = HandlerResult::deny("blocked");
        assert_eq!(denied.action, HandlerAction::Deny);
        assert_eq!(denied.message.as_deref(), Some("blocked"));
    }

    #[test]
    fn test_event_serializes_with_type_field() {
        let event = AgentEvent::new(
            EventType::SystemInfo,
            "test-agent",
            Some("session-1".into()),
            EventPayload::System(SystemPayload {
                message: Some("hello".into()),
            }),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "system:info");
        assert_eq!(json["agent"], "test-agent");
        assert_eq!(json["payload"]["message"], "hello");
    }
}
