//! Payload builders
//!
//! One pure function per lifecycle kind, transforming the host's raw
//! callback input into a typed event payload. Absent optional fields stay
//! `None`; nothing here errors on malformed input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::{
    DelegationPayload, SessionPayload, SystemPayload, ToolPayload, ToolStatus, UserInputPayload,
};
use crate::policy::PermissionPayload;
use crate::tools::categorize;

/// Raw host callback input
///
/// Every field is optional: host runtimes differ in what they attach per
/// hook kind, and partial input is handled by defaulting, never by erroring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookInput {
    pub session_id: Option<String>,
    pub transcript_path: Option<String>,
    pub cwd: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<Value>,
    pub tool_use_id: Option<String>,
    pub tool_response: Option<Value>,
    pub error: Option<String>,
    pub prompt: Option<String>,
    /// How the session started (SessionStart)
    pub source: Option<String>,
    /// Why the session or agent stopped, or why permission is requested
    pub reason: Option<String>,
    /// Notification text (Notification)
    pub message: Option<String>,
    /// What triggered a compaction (PreCompact)
    pub trigger: Option<String>,
    pub agent_id: Option<String>,
    pub agent_type: Option<String>,
}

impl HookInput {
    /// Input for a tool lifecycle callback
    pub fn for_tool(tool_name: impl Into<String>, tool_input: Value) -> Self {
        Self {
            tool_name: Some(tool_name.into()),
            tool_input: Some(tool_input),
            ..Default::default()
        }
    }

    /// Attach a session id
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    fn tool_input_str(&self, field: &str) -> Option<String> {
        self.tool_input
            .as_ref()
            .and_then(|v| v.get(field))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

fn tool_payload(input: &HookInput, status: ToolStatus) -> ToolPayload {
    let tool_name = input.tool_name.clone().unwrap_or_default();
    ToolPayload {
        category: categorize(&tool_name),
        tool_name,
        tool_use_id: input.tool_use_id.clone(),
        input: input.tool_input.clone(),
        output: None,
        status,
        error: None,
    }
}

/// Payload for `tool:begin`
pub fn build_tool_begin_payload(input: &HookInput) -> ToolPayload {
    tool_payload(input, ToolStatus::Pending)
}

/// Payload for `tool:complete`
pub fn build_tool_complete_payload(input: &HookInput) -> ToolPayload {
    let mut payload = tool_payload(input, ToolStatus::Success);
    payload.output = input.tool_response.clone();
    payload
}

/// Payload for `tool:error`; copies the error message verbatim
pub fn build_tool_error_payload(input: &HookInput) -> ToolPayload {
    let mut payload = tool_payload(input, ToolStatus::Error);
    payload.error = input.error.clone();
    payload
}

/// Payload for `user_input:complete`
pub fn build_user_input_payload(input: &HookInput) -> UserInputPayload {
    UserInputPayload {
        prompt: input.prompt.clone(),
        cwd: input.cwd.clone(),
    }
}

/// Payload for `session:start`
pub fn build_session_start_payload(input: &HookInput) -> SessionPayload {
    SessionPayload {
        source: input.source.clone(),
        cwd: input.cwd.clone(),
        transcript_path: input.transcript_path.clone(),
        ..Default::default()
    }
}

/// Payload for `session:end` and `agent:stop`
pub fn build_session_end_payload(input: &HookInput) -> SessionPayload {
    SessionPayload {
        reason: input.reason.clone(),
        cwd: input.cwd.clone(),
        transcript_path: input.transcript_path.clone(),
        ..Default::default()
    }
}

/// Payload for `session:compact`
pub fn build_compact_payload(input: &HookInput) -> SessionPayload {
    SessionPayload {
        trigger: input.trigger.clone(),
        cwd: input.cwd.clone(),
        transcript_path: input.transcript_path.clone(),
        ..Default::default()
    }
}

/// Payload for `delegation:start` and `delegation:stop`
pub fn build_delegation_payload(input: &HookInput) -> DelegationPayload {
    DelegationPayload {
        agent_id: input.agent_id.clone(),
        agent_type: input.agent_type.clone(),
        prompt: input.prompt.clone(),
    }
}

/// Payload for `system:info`
pub fn build_system_payload(input: &HookInput) -> SystemPayload {
    SystemPayload {
        message: input.message.clone(),
    }
}

/// Payload for `permission:request`
///
/// `command`, `args`, and `file_path` are copied from the tool input only
/// when present; nothing is fabricated for absent fields.
pub fn build_permission_payload(input: &HookInput) -> PermissionPayload {
    PermissionPayload {
        tool_name: input.tool_name.clone().unwrap_or_default(),
        command: input.tool_input_str("command"),
        args: input
            .tool_input
            .as_ref()
            .and_then(|v| v.get("args"))
            .cloned(),
        file_path: input.tool_input_str("file_path"),
        working_directory: input.cwd.clone(),
        reason: input.reason.clone(),
    }
}
