//! Permission handler
//!
//! Orchestrates the policy evaluator, an optional asynchronous
//! human-approval callback with timeout, and an optional decision observer.
//! Produces the final [`PermissionVerdict`] for every request. Also
//! implements [`EventHandler`] so it can subscribe directly to
//! `permission:request` events on an
//! [`EventRegistry`](crate::events::EventRegistry).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

use super::evaluator::evaluate;
use super::types::{DecidedBy, PermissionAction, PermissionPayload, PermissionPolicy};
use crate::events::{AgentEvent, EventHandler, HandlerAction, HandlerResult};

/// Asynchronous human-approval callback
///
/// Resolves to `true` to approve, `false` to deny. An `Err` is treated the
/// same as a timeout: the configured timeout action applies.
pub type AskCallback =
    Arc<dyn Fn(PermissionPayload) -> BoxFuture<'static, Result<bool>> + Send + Sync>;

/// Fire-and-forget decision observer
///
/// Invoked exactly once per request, after the verdict is finalized.
pub type DecisionCallback =
    Arc<dyn Fn(&PermissionPayload, PermissionAction, DecidedBy) + Send + Sync>;

/// Final verdict for one permission request
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionVerdict {
    pub action: PermissionAction,
    pub decided_by: DecidedBy,
    /// Human-readable explanation, intended for the approval UI
    pub message: String,
}

impl PermissionVerdict {
    fn new(action: PermissionAction, decided_by: DecidedBy, message: impl Into<String>) -> Self {
        Self {
            action,
            decided_by,
            message: message.into(),
        }
    }

    /// Map the verdict onto the handler-result shape the bridge reduces
    pub fn to_handler_result(&self) -> HandlerResult {
        let action = match self.action {
            PermissionAction::Allow => HandlerAction::Allow,
            PermissionAction::Deny => HandlerAction::Deny,
            PermissionAction::Ask => HandlerAction::Ask,
        };
        HandlerResult {
            action,
            message: Some(self.message.clone()),
        }
    }
}

/// Fixed behaviors that bypass policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Policy,
    AlwaysAllow,
    AlwaysDeny,
    AlwaysAsk,
}

/// Permission request orchestrator
pub struct PermissionHandler {
    policy: PermissionPolicy,
    mode: Mode,
    on_ask: Option<AskCallback>,
    on_decision: Option<DecisionCallback>,
    ask_timeout: Option<Duration>,
    /// Applied when the ask callback times out or fails
    timeout_action: PermissionAction,
}

impl PermissionHandler {
    /// Create a handler that evaluates the given policy
    pub fn new(policy: PermissionPolicy) -> Self {
        Self {
            policy,
            mode: Mode::Policy,
            on_ask: None,
            on_decision: None,
            ask_timeout: None,
            timeout_action: PermissionAction::Deny,
        }
    }

    /// Handler that approves everything without consulting any policy
    pub fn always_allow() -> Self {
        Self {
            mode: Mode::AlwaysAllow,
            ..Self::new(PermissionPolicy::new())
        }
    }

    /// Handler that denies everything without consulting any policy
    pub fn always_deny() -> Self {
        Self {
            mode: Mode::AlwaysDeny,
            ..Self::new(PermissionPolicy::new())
        }
    }

    /// Handler that defers everything to a human without consulting any policy
    pub fn always_ask() -> Self {
        Self {
            mode: Mode::AlwaysAsk,
            ..Self::new(PermissionPolicy::new())
        }
    }

    /// Set the human-approval callback
    pub fn with_ask_callback<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(PermissionPayload) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<bool>> + Send + 'static,
    {
        self.on_ask = Some(Arc::new(move |payload| f(payload).boxed()));
        self
    }

    /// Set the decision observer
    pub fn with_decision_callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&PermissionPayload, PermissionAction, DecidedBy) + Send + Sync + 'static,
    {
        self.on_decision = Some(Arc::new(f));
        self
    }

    /// Bound how long the ask callback may take
    pub fn with_ask_timeout(mut self, timeout: Duration) -> Self {
        self.ask_timeout = Some(timeout);
        self
    }

    /// Action applied when the ask callback times out or fails
    ///
    /// Only `Allow` and `Deny` are sensible here; the default is `Deny`.
    pub fn with_timeout_action(mut self, action: PermissionAction) -> Self {
        self.timeout_action = action;
        self
    }

    /// Decide one permission request
    ///
    /// The decision observer, when configured, fires exactly once after the
    /// verdict is finalized.
    pub async fn decide(&self, payload: &PermissionPayload) -> PermissionVerdict {
        let verdict = match self.mode {
            Mode::AlwaysAllow => PermissionVerdict::new(
                PermissionAction::Allow,
                DecidedBy::Policy,
                "Auto-approved (always-allow handler)",
            ),
            Mode::AlwaysDeny => PermissionVerdict::new(
                PermissionAction::Deny,
                DecidedBy::Policy,
                "Auto-denied (always-deny handler)",
            ),
            Mode::AlwaysAsk => PermissionVerdict::new(
                PermissionAction::Ask,
                DecidedBy::Policy,
                "Deferred to user (always-ask handler)",
            ),
            Mode::Policy => self.decide_by_policy(payload).await,
        };

        tracing::debug!(
            tool = %payload.tool_name,
            action = %verdict.action,
            decided_by = %verdict.decided_by,
            "permission verdict"
        );

        if let Some(on_decision) = &self.on_decision {
            on_decision(payload, verdict.action, verdict.decided_by);
        }
        verdict
    }

    async fn decide_by_policy(&self, payload: &PermissionPayload) -> PermissionVerdict {
        let name = self.policy.display_name();
        match evaluate(&self.policy, payload) {
            PermissionAction::Allow => PermissionVerdict::new(
                PermissionAction::Allow,
                DecidedBy::Policy,
                format!("Auto-approved by {name}"),
            ),
            PermissionAction::Deny => PermissionVerdict::new(
                PermissionAction::Deny,
                DecidedBy::Policy,
                format!("Auto-denied by {name}"),
            ),
            PermissionAction::Ask => self.ask_user(payload).await,
        }
    }

    async fn ask_user(&self, payload: &PermissionPayload) -> PermissionVerdict {
        let Some(on_ask) = &self.on_ask else {
            return PermissionVerdict::new(
                PermissionAction::Ask,
                DecidedBy::Default,
                "Permission required but no ask callback is configured",
            );
        };

        let ask = on_ask(payload.clone());
        let outcome = match self.ask_timeout {
            // The loser of the race is dropped here, never awaited further.
            Some(timeout) => tokio::time::timeout(timeout, ask).await,
            None => Ok(ask.await),
        };

        match outcome {
            Ok(Ok(true)) => {
                PermissionVerdict::new(PermissionAction::Allow, DecidedBy::User, "Approved by user")
            }
            Ok(Ok(false)) => {
                PermissionVerdict::new(PermissionAction::Deny, DecidedBy::User, "Denied by user")
            }
            Ok(Err(err)) => PermissionVerdict::new(
                self.timeout_action,
                DecidedBy::Default,
                format!("Ask callback failed: {err}"),
            ),
            Err(_elapsed) => {
                let timeout = self.ask_timeout.unwrap_or_default();
                PermissionVerdict::new(
                    self.timeout_action,
                    DecidedBy::Default,
                    format!("Ask timed out after {}ms", timeout.as_millis()),
                )
            }
        }
    }
}

impl std::fmt::Debug for PermissionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionHandler")
            .field("policy", &self.policy.display_name())
            .field("mode", &self.mode)
            .field("has_ask", &self.on_ask.is_some())
            .field("ask_timeout", &self.ask_timeout)
            .field("timeout_action", &self.timeout_action)
            .finish()
    }
}

#[async_trait]
impl EventHandler for PermissionHandler {
    async fn handle(&self, event: Arc<AgentEvent>) -> Result<HandlerResult> {
        let Some(payload) = event.payload.as_permission() else {
            return Ok(HandlerResult::none());
        };
        let verdict = self.decide(payload).await;
        Ok(verdict.to_handler_result())
    }
}
