//! Permission policy system
//!
//! A declarative, serializable ruleset plus the machinery that applies it:
//!
//! - [`PermissionPolicy`] - pure data: tool allow/deny lists, command
//!   pattern rules, path globs, and a default action
//! - [`evaluate`] - deterministic precedence over a policy and one request
//! - built-in safe/dangerous command libraries and
//!   [`command_risk_assessment`]
//! - [`PermissionHandler`] - orchestrates the evaluator, an optional async
//!   human-approval callback with timeout, and a decision observer
//!
//! # Example
//!
//! ```ignore
//! use agent_gatekeeper::policy::{PermissionHandler, PermissionPolicy, PermissionPayload};
//! use std::time::Duration;
//!
//! let policy = PermissionPolicy::new()
//!     .with_name("workspace")
//!     .allow_tool("Read")
//!     .deny_command("rm -rf *")
//!     .protected_path("/etc/*");
//!
//! let handler = PermissionHandler::new(policy)
//!     .with_ask_callback(|payload| async move { Ok(prompt_user(&payload).await) })
//!     .with_ask_timeout(Duration::from_secs(30));
//!
//! let verdict = handler.decide(&PermissionPayload::for_command("Bash", "git status")).await;
//! ```

mod evaluator;
mod handler;
mod patterns;
mod types;

pub use evaluator::evaluate;
pub use handler::{AskCallback, DecisionCallback, PermissionHandler, PermissionVerdict};
pub use patterns::{
    command_risk_assessment, glob_match, is_dangerous_command, is_safe_command, RiskAssessment,
    RiskLevel,
};
pub use types::{
    merge_policies, CommandRules, DecidedBy, PathRules, PatternRule, PermissionAction,
    PermissionPayload, PermissionPolicy, ToolRules,
};
