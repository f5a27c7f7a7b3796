//! Policy evaluation
//!
//! `evaluate` is a pure function from (policy, payload) to a permission
//! action, with a fixed precedence order:
//!
//! 1. tool denied
//! 2. tool allowed (deferred for shell tools carrying a command)
//! 3. command patterns, denied before allowed
//! 4. path globs, protected before writable
//! 5. built-in dangerous/safe heuristics (skipped when the policy
//!    defaults to deny)
//! 6. the policy's default action, `ask` when unset

use super::patterns::{glob_match, is_dangerous_command, is_safe_command};
use super::types::{PermissionAction, PermissionPayload, PermissionPolicy};
use crate::tools::{categorize, ToolCategory};

/// Evaluate a permission request against a policy
pub fn evaluate(policy: &PermissionPolicy, payload: &PermissionPayload) -> PermissionAction {
    let tool = payload.tool_name.as_str();

    // 1. Tool-level denial beats everything.
    if policy.tools.denied.iter().any(|t| t == tool) {
        tracing::debug!(tool, "tool denied by policy");
        return PermissionAction::Deny;
    }

    // 2. Tool-level allowance. For a shell tool carrying a command the
    //    allowance is deferred: command rules still get a chance to
    //    override it.
    let tool_allowed = policy.tools.allowed.iter().any(|t| t == tool);
    let shell_with_command =
        categorize(tool) == ToolCategory::Shell && payload.command.is_some();
    if tool_allowed && !shell_with_command {
        return PermissionAction::Allow;
    }

    // 3. Command pattern rules, denied list first.
    if let Some(command) = payload.command.as_deref() {
        for rule in &policy.commands.denied {
            if glob_match(&rule.pattern, command) {
                tracing::debug!(command, pattern = %rule.pattern, "command denied by policy");
                return PermissionAction::Deny;
            }
        }
        for rule in &policy.commands.allowed {
            if glob_match(&rule.pattern, command) {
                return match rule.action {
                    PermissionAction::Ask => PermissionAction::Ask,
                    _ => PermissionAction::Allow,
                };
            }
        }
    }

    // No command rule overrode the deferred allowance from step 2.
    if tool_allowed {
        return PermissionAction::Allow;
    }

    // 4. Path rules. Protected wins even when a writable glob also matches.
    if let Some(file_path) = payload.file_path.as_deref() {
        if policy.paths.protected.iter().any(|g| glob_match(g, file_path)) {
            return PermissionAction::Ask;
        }
        if policy.paths.writable.iter().any(|g| glob_match(g, file_path)) {
            return PermissionAction::Allow;
        }
    }

    // 5. Built-in heuristics, unless the policy already defaults to deny.
    let default_action = policy.default_action.unwrap_or(PermissionAction::Ask);
    if default_action != PermissionAction::Deny {
        if let Some(command) = payload.command.as_deref() {
            if is_dangerous_command(command) {
                tracing::debug!(command, "command matches built-in dangerous pattern");
                return PermissionAction::Deny;
            }
            if is_safe_command(command) {
                return PermissionAction::Allow;
            }
        }
    }

    // 6. Fallback.
    default_action
}
