//! Policy data types
//!
//! A [`PermissionPolicy`] is pure data: constructible in code, loadable from
//! JSON, mergeable with other policies, and passed by reference into the
//! evaluator on every request. No behavior is embedded here beyond merge and
//! serde plumbing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{GateError, GateResult};

/// A permission outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    /// Proceed without asking
    Allow,
    /// Block the action
    Deny,
    /// Defer to a human
    Ask,
}

impl PermissionAction {
    /// Stable string form, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::Allow => "allow",
            PermissionAction::Deny => "deny",
            PermissionAction::Ask => "ask",
        }
    }
}

impl std::fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provenance of a permission verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecidedBy {
    /// The declarative policy decided on its own
    Policy,
    /// A human answered the ask callback
    User,
    /// Fallback behavior (timeout, missing callback, ask error)
    Default,
}

impl DecidedBy {
    /// Stable string form, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DecidedBy::Policy => "policy",
            DecidedBy::User => "user",
            DecidedBy::Default => "default",
        }
    }
}

impl std::fmt::Display for DecidedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A glob pattern paired with the action to take when it matches
///
/// In `commands.allowed` the action is honored (`allow` or `ask`); in
/// `commands.denied` a match always denies regardless of the action field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Glob pattern (`*` matches any run of characters, rest literal)
    pub pattern: String,
    /// Action when the pattern matches
    #[serde(default = "default_rule_action")]
    pub action: PermissionAction,
}

fn default_rule_action() -> PermissionAction {
    PermissionAction::Allow
}

impl PatternRule {
    /// Rule that allows matching commands
    pub fn allow(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            action: PermissionAction::Allow,
        }
    }

    /// Rule that defers matching commands to a human
    pub fn ask(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            action: PermissionAction::Ask,
        }
    }

    /// Rule for the denied list
    pub fn deny(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            action: PermissionAction::Deny,
        }
    }
}

/// Tool-level allow/deny lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolRules {
    pub allowed: Vec<String>,
    pub denied: Vec<String>,
}

/// Command-pattern allow/deny lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandRules {
    pub allowed: Vec<PatternRule>,
    pub denied: Vec<PatternRule>,
}

/// Path glob lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathRules {
    pub writable: Vec<String>,
    pub protected: Vec<String>,
}

/// Declarative ruleset governing tool, command, and path permissions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionPolicy {
    /// Display name, used in verdict messages
    pub name: Option<String>,
    /// Fallback action when no rule matches (treated as `ask` when unset)
    pub default_action: Option<PermissionAction>,
    pub tools: ToolRules,
    pub commands: CommandRules,
    pub paths: PathRules,
}

impl PermissionPolicy {
    /// Create an empty policy (everything falls through to `ask`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the fallback action
    pub fn with_default_action(mut self, action: PermissionAction) -> Self {
        self.default_action = Some(action);
        self
    }

    /// Allow an entire tool by name
    pub fn allow_tool(mut self, tool_name: impl Into<String>) -> Self {
        self.tools.allowed.push(tool_name.into());
        self
    }

    /// Deny an entire tool by name
    pub fn deny_tool(mut self, tool_name: impl Into<String>) -> Self {
        self.tools.denied.push(tool_name.into());
        self
    }

    /// Allow commands matching a glob pattern
    pub fn allow_command(mut self, pattern: impl Into<String>) -> Self {
        self.commands.allowed.push(PatternRule::allow(pattern));
        self
    }

    /// Defer commands matching a glob pattern to a human
    pub fn ask_command(mut self, pattern: impl Into<String>) -> Self {
        self.commands.allowed.push(PatternRule::ask(pattern));
        self
    }

    /// Deny commands matching a glob pattern
    pub fn deny_command(mut self, pattern: impl Into<String>) -> Self {
        self.commands.denied.push(PatternRule::deny(pattern));
        self
    }

    /// Mark a path glob as writable without asking
    pub fn writable_path(mut self, pattern: impl Into<String>) -> Self {
        self.paths.writable.push(pattern.into());
        self
    }

    /// Mark a path glob as protected (writes require a human)
    pub fn protected_path(mut self, pattern: impl Into<String>) -> Self {
        self.paths.protected.push(pattern.into());
        self
    }

    /// Name for verdict messages, with the documented fallback
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed policy")
    }

    /// Parse a policy from JSON
    pub fn from_json(json: &str) -> GateResult<Self> {
        serde_json::from_str(json).map_err(GateError::from)
    }

    /// Serialize the policy to JSON
    pub fn to_json(&self) -> GateResult<String> {
        serde_json::to_string_pretty(self).map_err(GateError::from)
    }
}

fn dedup_strings(list: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    list.retain(|item| seen.insert(item.clone()));
}

fn dedup_rules(list: &mut Vec<PatternRule>) {
    let mut seen = std::collections::HashSet::new();
    list.retain(|rule| seen.insert((rule.pattern.clone(), rule.action)));
}

/// Merge two policies into one
///
/// The overlay wins on `name` and `default_action` when it sets them; list
/// fields concatenate in (base, overlay) order and deduplicate, preserving
/// first occurrence.
pub fn merge_policies(base: &PermissionPolicy, overlay: &PermissionPolicy) -> PermissionPolicy {
    let mut merged = base.clone();

    if overlay.name.is_some() {
        merged.name = overlay.name.clone();
    }
    if overlay.default_action.is_some() {
        merged.default_action = overlay.default_action;
    }

    merged.tools.allowed.extend(overlay.tools.allowed.iter().cloned());
    merged.tools.denied.extend(overlay.tools.denied.iter().cloned());
    dedup_strings(&mut merged.tools.allowed);
    dedup_strings(&mut merged.tools.denied);

    merged.commands.allowed.extend(overlay.commands.allowed.iter().cloned());
    merged.commands.denied.extend(overlay.commands.denied.iter().cloned());
    dedup_rules(&mut merged.commands.allowed);
    dedup_rules(&mut merged.commands.denied);

    merged.paths.writable.extend(overlay.paths.writable.iter().cloned());
    merged.paths.protected.extend(overlay.paths.protected.iter().cloned());
    dedup_strings(&mut merged.paths.writable);
    dedup_strings(&mut merged.paths.protected);

    merged
}

/// Normalized shape of one permission request
///
/// Independent of which host runtime produced it. Optional fields stay `None`
/// when the host input did not carry them; nothing is fabricated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionPayload {
    /// Name of the tool requesting permission
    pub tool_name: String,
    /// Shell command, when the tool executes one
    pub command: Option<String>,
    /// Tool arguments, verbatim from the host input
    pub args: Option<Value>,
    /// File the tool wants to touch
    pub file_path: Option<String>,
    /// Working directory of the agent at request time
    pub working_directory: Option<String>,
    /// Host-supplied reason for the request
    pub reason: Option<String>,
}

impl PermissionPayload {
    /// Payload for a plain tool invocation
    pub fn for_tool(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            ..Default::default()
        }
    }

    /// Payload for a shell command
    pub fn for_command(tool_name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            command: Some(command.into()),
            ..Default::default()
        }
    }

    /// Attach a file path
    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_builder() {
        let policy = PermissionPolicy::new()
            .with_name("strict")
            .with_default_action(PermissionAction::Deny)
            .allow_tool("Read")
            .deny_tool("Bash")
            .deny_command("rm -rf *");

        assert_eq!(policy.display_name(), "strict");
        assert_eq!(policy.default_action, Some(PermissionAction::Deny));
        assert_eq!(policy.tools.allowed, vec!["Read"]);
        assert_eq!(policy.tools.denied, vec!["Bash"]);
        assert_eq!(policy.commands.denied.len(), 1);
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(PermissionPolicy::new().display_name(), "unnamed policy");
    }

    #[test]
    fn test_merge_later_wins_scalars() {
        let base = PermissionPolicy::new()
            .with_name("base")
            .with_default_action(PermissionAction::Allow);
        let overlay = PermissionPolicy::new()
            .with_name("overlay")
            .with_default_action(PermissionAction::Deny);

        let merged = merge_policies(&base, &overlay);
        assert_eq!(merged.name.as_deref(), Some("overlay"));
        assert_eq!(merged.default_action, Some(PermissionAction::Deny));

        // Overlay silence keeps the base value.
        let merged = merge_policies(&base, &PermissionPolicy::new());
        assert_eq!(merged.name.as_deref(), Some("base"));
        assert_eq!(merged.default_action, Some(PermissionAction::Allow));
    }

    #[test]
    fn test_merge_concatenates_and_dedupes() {
        let base = PermissionPolicy::new().allow_tool("Read").allow_tool("Grep");
        let overlay = PermissionPolicy::new().allow_tool("Grep").allow_tool("Write");

        let merged = merge_policies(&base, &overlay);
        assert_eq!(merged.tools.allowed, vec!["Read", "Grep", "Write"]);
    }

    #[test]
    fn test_merge_dedupes_pattern_rules() {
        let base = PermissionPolicy::new().deny_command("rm -rf *");
        let overlay = PermissionPolicy::new()
            .deny_command("rm -rf *")
            .deny_command("sudo *");

        let merged = merge_policies(&base, &overlay);
        let patterns: Vec<&str> = merged
            .commands
            .denied
            .iter()
            .map(|r| r.pattern.as_str())
            .collect();
        assert_eq!(patterns, vec!["rm -rf *", "sudo *"]);
    }

    #[test]
    fn test_policy_json_round_trip() {
        let policy = PermissionPolicy::new()
            .with_name("workspace")
            .allow_tool("Read")
            .ask_command("git push *")
            .protected_path("/etc/*");

        let json = policy.to_json().unwrap();
        let parsed = PermissionPolicy::from_json(&json).unwrap();
        assert_eq!(parsed, policy);
    }

    #[test]
    fn test_policy_from_partial_json() {
        // Absent sections default rather than erroring.
        let policy = PermissionPolicy::from_json(r#"{"default_action":"deny"}"#).unwrap();
        assert_eq!(policy.default_action, Some(PermissionAction::Deny));
        assert!(policy.tools.allowed.is_empty());

        assert!(PermissionPolicy::from_json("not json").is_err());
    }

    #[test]
    fn test_pattern_rule_action_defaults_to_allow() {
        let rule: PatternRule = serde_json::from_str(r#"{"pattern":"ls *"}"#).unwrap();
        assert_eq!(rule.action, PermissionAction::Allow);
    }
}
