//! Hook Bridge
//!
//! Adapts the host runtime's lifecycle callback slots into events on an
//! [`EventRegistry`] and reduces the handlers' results back into the control
//! object the host expects. Every one of the twelve supported hook kinds
//! follows the same 3 steps: build the payload, wrap it in a fresh
//! [`AgentEvent`], emit and reduce.

use std::sync::Arc;

use serde::Serialize;

use super::payloads::{
    build_compact_payload, build_delegation_payload, build_permission_payload,
    build_session_end_payload, build_session_start_payload, build_system_payload,
    build_tool_begin_payload, build_tool_complete_payload, build_tool_error_payload,
    build_user_input_payload, HookInput,
};
use crate::events::{
    AgentEvent, EventPayload, EventRegistry, EventType, HandlerAction, HandlerResult,
};

/// The host runtime's hook callback slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    PreToolUse,
    PostToolUse,
    PostToolUseFailure,
    UserPromptSubmit,
    SessionStart,
    SessionEnd,
    Stop,
    SubagentStart,
    SubagentStop,
    PreCompact,
    PermissionRequest,
    Notification,
}

impl HookKind {
    /// Host-facing name, used in `hookSpecificOutput.hookEventName`
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::PreToolUse => "PreToolUse",
            HookKind::PostToolUse => "PostToolUse",
            HookKind::PostToolUseFailure => "PostToolUseFailure",
            HookKind::UserPromptSubmit => "UserPromptSubmit",
            HookKind::SessionStart => "SessionStart",
            HookKind::SessionEnd => "SessionEnd",
            HookKind::Stop => "Stop",
            HookKind::SubagentStart => "SubagentStart",
            HookKind::SubagentStop => "SubagentStop",
            HookKind::PreCompact => "PreCompact",
            HookKind::PermissionRequest => "PermissionRequest",
            HookKind::Notification => "Notification",
        }
    }

    /// Whether this hook gates an action that has not executed yet
    ///
    /// Pre-execution denials become permission decision objects; all other
    /// denials become stop objects.
    pub fn is_pre_execution(&self) -> bool {
        matches!(self, HookKind::PreToolUse | HookKind::PermissionRequest)
    }
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The permission-decision half of a hook control object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookDecisionOutput {
    pub hook_event_name: String,
    /// `"allow"` or `"deny"`
    pub permission_decision: String,
    pub permission_decision_reason: String,
}

/// Control object returned to the host runtime
///
/// Serializes to exactly one of the three shapes the host understands:
/// `{}`, `{"hookSpecificOutput":{...}}`, or
/// `{"continue":false,"stopReason":...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HookOutput {
    /// Proceed unmodified
    Continue {},
    /// Pre-execution permission decision
    Decision {
        #[serde(rename = "hookSpecificOutput")]
        hook_specific_output: HookDecisionOutput,
    },
    /// Stop the flow (non-pre-execution deny)
    Stop {
        #[serde(rename = "continue")]
        continue_: bool,
        #[serde(rename = "stopReason")]
        stop_reason: String,
    },
}

impl HookOutput {
    /// Neutral "proceed" object
    pub fn proceed() -> Self {
        HookOutput::Continue {}
    }

    fn decision(kind: HookKind, decision: &str, reason: impl Into<String>) -> Self {
        HookOutput::Decision {
            hook_specific_output: HookDecisionOutput {
                hook_event_name: kind.as_str().to_string(),
                permission_decision: decision.to_string(),
                permission_decision_reason: reason.into(),
            },
        }
    }

    /// Deny a pre-execution hook
    pub fn deny(kind: HookKind, reason: impl Into<String>) -> Self {
        Self::decision(kind, "deny", reason)
    }

    /// Approve a permission-request hook
    pub fn allow(kind: HookKind, reason: impl Into<String>) -> Self {
        Self::decision(kind, "allow", reason)
    }

    /// Stop the flow with a reason
    pub fn stop(reason: impl Into<String>) -> Self {
        HookOutput::Stop {
            continue_: false,
            stop_reason: reason.into(),
        }
    }

    /// Whether this output lets the host proceed unmodified
    pub fn is_proceed(&self) -> bool {
        matches!(self, HookOutput::Continue {})
    }
}

/// Reduce handler results into one control object
///
/// Scans in registration order; the first deny wins. Allow/ask results are
/// only meaningful for permission-request hooks; for every other kind they
/// are left to the permission-specific consumer and ignored here.
fn reduce(kind: HookKind, results: &[HandlerResult]) -> HookOutput {
    if let Some(denied) = results.iter().find(|r| r.action == HandlerAction::Deny) {
        let reason = denied
            .message
            .clone()
            .unwrap_or_else(|| format!("Denied by {kind} hook"));
        return if kind.is_pre_execution() {
            HookOutput::deny(kind, reason)
        } else {
            HookOutput::stop(reason)
        };
    }

    if kind == HookKind::PermissionRequest {
        if let Some(allowed) = results.iter().find(|r| r.action == HandlerAction::Allow) {
            let reason = allowed
                .message
                .clone()
                .unwrap_or_else(|| "Approved by hook".to_string());
            return HookOutput::allow(kind, reason);
        }
    }

    HookOutput::proceed()
}

/// Adapter between the host runtime's hook slots and the event registry
pub struct HookBridge {
    registry: Arc<EventRegistry>,
    /// Identifier of the emitting agent implementation
    agent: String,
}

impl HookBridge {
    /// Create a bridge emitting through the given registry
    pub fn new(registry: Arc<EventRegistry>, agent: impl Into<String>) -> Self {
        Self {
            registry,
            agent: agent.into(),
        }
    }

    /// The registry this bridge emits through
    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    async fn dispatch(
        &self,
        kind: HookKind,
        event_type: EventType,
        input: &HookInput,
        payload: EventPayload,
    ) -> HookOutput {
        let event = AgentEvent::new(event_type, &self.agent, input.session_id.clone(), payload);
        tracing::debug!(hook = %kind, event_id = %event.id, "bridging hook callback");
        let results = self.registry.emit(event).await;
        let output = reduce(kind, &results);
        if !output.is_proceed() {
            tracing::info!(hook = %kind, ?output, "hook reduced to a non-neutral control object");
        }
        output
    }

    /// PreToolUse: a tool is about to execute
    pub async fn pre_tool_use(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Tool(build_tool_begin_payload(input));
        self.dispatch(HookKind::PreToolUse, EventType::ToolBegin, input, payload)
            .await
    }

    /// PostToolUse: a tool finished successfully
    pub async fn post_tool_use(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Tool(build_tool_complete_payload(input));
        self.dispatch(HookKind::PostToolUse, EventType::ToolComplete, input, payload)
            .await
    }

    /// PostToolUseFailure: a tool failed
    pub async fn post_tool_use_failure(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Tool(build_tool_error_payload(input));
        self.dispatch(
            HookKind::PostToolUseFailure,
            EventType::ToolError,
            input,
            payload,
        )
        .await
    }

    /// UserPromptSubmit: the user submitted a prompt
    pub async fn user_prompt_submit(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::UserInput(build_user_input_payload(input));
        self.dispatch(
            HookKind::UserPromptSubmit,
            EventType::UserInputComplete,
            input,
            payload,
        )
        .await
    }

    /// SessionStart: a session started
    pub async fn session_start(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Session(build_session_start_payload(input));
        self.dispatch(HookKind::SessionStart, EventType::SessionStart, input, payload)
            .await
    }

    /// SessionEnd: a session ended
    pub async fn session_end(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Session(build_session_end_payload(input));
        self.dispatch(HookKind::SessionEnd, EventType::SessionEnd, input, payload)
            .await
    }

    /// Stop: the main agent finished responding
    pub async fn stop(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Session(build_session_end_payload(input));
        self.dispatch(HookKind::Stop, EventType::AgentStop, input, payload)
            .await
    }

    /// SubagentStart: a subagent was spawned
    pub async fn subagent_start(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Delegation(build_delegation_payload(input));
        self.dispatch(
            HookKind::SubagentStart,
            EventType::DelegationStart,
            input,
            payload,
        )
        .await
    }

    /// SubagentStop: a subagent finished
    pub async fn subagent_stop(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Delegation(build_delegation_payload(input));
        self.dispatch(
            HookKind::SubagentStop,
            EventType::DelegationStop,
            input,
            payload,
        )
        .await
    }

    /// PreCompact: the session context is about to be compacted
    pub async fn pre_compact(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Session(build_compact_payload(input));
        self.dispatch(HookKind::PreCompact, EventType::SessionCompact, input, payload)
            .await
    }

    /// PermissionRequest: the host asks for a permission decision
    pub async fn permission_request(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::Permission(build_permission_payload(input));
        self.dispatch(
            HookKind::PermissionRequest,
            EventType::PermissionRequest,
            input,
            payload,
        )
        .await
    }

    /// Notification: informational message from the host
    pub async fn notification(&self, input: &HookInput) -> HookOutput {
        let payload = EventPayload::System(build_system_payload(input));
        self.dispatch(HookKind::Notification, EventType::SystemInfo, input, payload)
            .await
    }
}

impl std::fmt::Debug for HookBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookBridge")
            .field("agent", &self.agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::HandlerResult;
    use serde_json::json;

    fn bridge_with(registry: EventRegistry) -> HookBridge {
        HookBridge::new(Arc::new(registry), "test-agent")
    }

    #[test]
    fn test_reduce_first_deny_wins() {
        let results = vec![
            HandlerResult::none(),
            HandlerResult::deny("first"),
            HandlerResult::deny("second"),
        ];
        let output = reduce(HookKind::PreToolUse, &results);
        assert_eq!(
            output,
            HookOutput::deny(HookKind::PreToolUse, "first")
        );
    }

    #[test]
    fn test_reduce_ignores_allow_outside_permission_request() {
        let results = vec![HandlerResult::allow(), HandlerResult::ask()];
        assert!(reduce(HookKind::PreToolUse, &results).is_proceed());
        assert!(reduce(HookKind::SessionStart, &results).is_proceed());
    }

    #[test]
    fn test_reduce_permission_request_allow() {
        let results = vec![HandlerResult::none(), HandlerResult::allow()];
        let output = reduce(HookKind::PermissionRequest, &results);
        assert_eq!(
            output,
            HookOutput::allow(HookKind::PermissionRequest, "Approved by hook")
        );
    }

    #[test]
    fn test_hook_output_json_shapes() {
        assert_eq!(
            serde_json::to_value(HookOutput::proceed()).unwrap(),
            json!({})
        );

        assert_eq!(
            serde_json::to_value(HookOutput::deny(HookKind::PreToolUse, "blocked")).unwrap(),
            json!({
                "hookSpecificOutput": {
                    "hookEventName": "PreToolUse",
                    "permissionDecision": "deny",
                    "permissionDecisionReason": "blocked"
                }
            })
        );

        assert_eq!(
            serde_json::to_value(HookOutput::stop("blocked")).unwrap(),
            json!({"continue": false, "stopReason": "blocked"})
        );
    }

    #[tokio::test]
    async fn test_pre_tool_use_deny_end_to_end() {
        let registry = EventRegistry::new();
        registry.on_fn(EventType::ToolBegin, |_event| async {
            Ok(HandlerResult::deny("blocked"))
        });
        let bridge = bridge_with(registry);

        let input = HookInput::for_tool("Bash", json!({"command": "rm -rf /"}));
        let output = bridge.pre_tool_use(&input).await;

        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "hookSpecificOutput": {
                    "hookEventName": "PreToolUse",
                    "permissionDecision": "deny",
                    "permissionDecisionReason": "blocked"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_session_start_deny_becomes_stop() {
        let registry = EventRegistry::new();
        registry.on_fn(EventType::SessionStart, |_event| async {
            Ok(HandlerResult::deny("blocked"))
        });
        let bridge = bridge_with(registry);

        let output = bridge.session_start(&HookInput::default()).await;
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"continue": false, "stopReason": "blocked"})
        );
    }

    #[tokio::test]
    async fn test_no_handlers_means_proceed() {
        let bridge = bridge_with(EventRegistry::new());
        let input = HookInput::for_tool("Read", json!({"file_path": "/tmp/a"}));
        assert!(bridge.pre_tool_use(&input).await.is_proceed());
        assert!(bridge.notification(&HookInput::default()).await.is_proceed());
    }

    #[tokio::test]
    async fn test_bridge_builds_correct_event_types() {
        let registry = EventRegistry::new();
        registry.on_category_fn("tool", |event| async move {
            // Category listeners see all three tool kinds.
            assert!(event.event_type.as_str().starts_with("tool:"));
            Ok(HandlerResult::none())
        });
        let bridge = bridge_with(registry);

        let input = HookInput::for_tool("Bash", json!({"command": "ls"}));
        assert!(bridge.pre_tool_use(&input).await.is_proceed());
        assert!(bridge.post_tool_use(&input).await.is_proceed());
        assert!(bridge.post_tool_use_failure(&input).await.is_proceed());
    }

    #[tokio::test]
    async fn test_permission_request_with_permission_handler() {
        use crate::policy::{PermissionHandler, PermissionPolicy};

        let registry = EventRegistry::new();
        let handler = PermissionHandler::new(
            PermissionPolicy::new()
                .with_name("strict")
                .deny_command("rm -rf *"),
        );
        registry.on(EventType::PermissionRequest, Arc::new(handler));
        let bridge = bridge_with(registry);

        let input = HookInput::for_tool("Bash", json!({"command": "rm -rf /"}));
        let output = bridge.permission_request(&input).await;

        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "hookSpecificOutput": {
                    "hookEventName": "PermissionRequest",
                    "permissionDecision": "deny",
                    "permissionDecisionReason": "Auto-denied by strict"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_permission_request_allow_path() {
        use crate::policy::{PermissionHandler, PermissionPolicy};

        let registry = EventRegistry::new();
        let handler = PermissionHandler::new(
            PermissionPolicy::new().with_name("trusted").allow_tool("Read"),
        );
        registry.on(EventType::PermissionRequest, Arc::new(handler));
        let bridge = bridge_with(registry);

        let input = HookInput::for_tool("Read", json!({"file_path": "/tmp/a"}));
        let output = bridge.permission_request(&input).await;

        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "hookSpecificOutput": {
                    "hookEventName": "PermissionRequest",
                    "permissionDecision": "allow",
                    "permissionDecisionReason": "Auto-approved by trusted"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_stop_hook_deny_stops_flow() {
        let registry = EventRegistry::new();
        registry.on_fn(EventType::AgentStop, |_event| async {
            Ok(HandlerResult::deny("session budget exhausted"))
        });
        let bridge = bridge_with(registry);

        let output = bridge.stop(&HookInput::default()).await;
        assert_eq!(output, HookOutput::stop("session budget exhausted"));
    }

    #[tokio::test]
    async fn test_deny_without_message_gets_default_reason() {
        let registry = EventRegistry::new();
        registry.on_fn(EventType::ToolBegin, |_event| async {
            Ok(HandlerResult {
                action: HandlerAction::Deny,
                message: None,
            })
        });
        let bridge = bridge_with(registry);

        let input = HookInput::for_tool("Bash", json!({"command": "ls"}));
        let output = bridge.pre_tool_use(&input).await;
        assert_eq!(
            output,
            HookOutput::deny(HookKind::PreToolUse, "Denied by PreToolUse hook")
        );
    }
}
