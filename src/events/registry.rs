//! Event Registry
//!
//! A typed publish/subscribe hub. Listeners register for a specific event
//! type, a category prefix (`"tool"` receives every `tool:*` event), or all
//! events. `emit` fans out to every matching handler concurrently, awaits all
//! of them, and returns their results in registration order.
//!
//! The registry is an explicitly constructed, injected instance; there is no
//! ambient global. Whoever composes the bridge owns it and hands it to every
//! consumer.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;

use super::types::{AgentEvent, EventHandler, EventType, FnHandler, HandlerResult};

/// Handle for unregistering a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Entry {
    id: ListenerId,
    handler: Arc<dyn EventHandler>,
}

#[derive(Default)]
struct Listeners {
    /// Per-event-type listeners, in registration order
    by_type: HashMap<EventType, Vec<Entry>>,
    /// Category-prefix listeners, in registration order
    by_category: Vec<(String, Entry)>,
    /// Listeners for every event, in registration order
    global: Vec<Entry>,
    next_id: u64,
}

impl Listeners {
    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Typed publish/subscribe hub for agent lifecycle events
#[derive(Default)]
pub struct EventRegistry {
    listeners: RwLock<Listeners>,
}

impl EventRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event type
    ///
    /// Registering the same handler twice registers it twice; deduping is
    /// the caller's responsibility.
    pub fn on(&self, event_type: EventType, handler: Arc<dyn EventHandler>) -> ListenerId {
        let mut listeners = self.listeners.write().unwrap();
        let id = listeners.next_id();
        listeners
            .by_type
            .entry(event_type)
            .or_default()
            .push(Entry { id, handler });
        id
    }

    /// Register a handler for every event whose type starts with a
    /// category prefix (`"tool"` matches `tool:begin`, `tool:complete`, ...)
    pub fn on_category(
        &self,
        prefix: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> ListenerId {
        let prefix = prefix.into();
        let mut listeners = self.listeners.write().unwrap();
        let id = listeners.next_id();
        listeners.by_category.push((prefix, Entry { id, handler }));
        id
    }

    /// Register a handler for every event
    pub fn on_all(&self, handler: Arc<dyn EventHandler>) -> ListenerId {
        let mut listeners = self.listeners.write().unwrap();
        let id = listeners.next_id();
        listeners.global.push(Entry { id, handler });
        id
    }

    /// Register an async closure for one event type
    pub fn on_fn<F, Fut>(&self, event_type: EventType, f: F) -> ListenerId
    where
        F: Fn(Arc<AgentEvent>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<HandlerResult>> + Send + 'static,
    {
        self.on(event_type, wrap_fn(f))
    }

    /// Register an async closure for a category prefix
    pub fn on_category_fn<F, Fut>(&self, prefix: impl Into<String>, f: F) -> ListenerId
    where
        F: Fn(Arc<AgentEvent>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<HandlerResult>> + Send + 'static,
    {
        self.on_category(prefix, wrap_fn(f))
    }

    /// Register an async closure for every event
    pub fn on_all_fn<F, Fut>(&self, f: F) -> ListenerId
    where
        F: Fn(Arc<AgentEvent>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<HandlerResult>> + Send + 'static,
    {
        self.on_all(wrap_fn(f))
    }

    /// Remove a previously registered listener
    ///
    /// Returns whether a listener was removed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap();
        for entries in listeners.by_type.values_mut() {
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                entries.remove(pos);
                return true;
            }
        }
        if let Some(pos) = listeners.by_category.iter().position(|(_, e)| e.id == id) {
            listeners.by_category.remove(pos);
            return true;
        }
        if let Some(pos) = listeners.global.iter().position(|e| e.id == id) {
            listeners.global.remove(pos);
            return true;
        }
        false
    }

    /// Number of listeners that would receive an event of this type
    pub fn listener_count(&self, event_type: EventType) -> usize {
        let listeners = self.listeners.read().unwrap();
        let typed = listeners
            .by_type
            .get(&event_type)
            .map(|v| v.len())
            .unwrap_or(0);
        let category = listeners
            .by_category
            .iter()
            .filter(|(prefix, _)| category_matches(prefix, event_type))
            .count();
        typed + category + listeners.global.len()
    }

    /// Dispatch an event to every matching handler
    ///
    /// Handlers run concurrently; results come back in registration order
    /// (type-specific listeners first, then category, then global). A
    /// handler returning `Err` yields a synthesized
    /// [`HandlerResult::none`] slot and a warning; it never aborts the
    /// dispatch or masks the other results.
    pub async fn emit(&self, event: AgentEvent) -> Vec<HandlerResult> {
        let event = Arc::new(event);

        // Snapshot matching handlers so the lock is not held across await.
        let handlers: Vec<Arc<dyn EventHandler>> = {
            let listeners = self.listeners.read().unwrap();
            let typed = listeners
                .by_type
                .get(&event.event_type)
                .into_iter()
                .flatten()
                .map(|e| e.handler.clone());
            let category = listeners
                .by_category
                .iter()
                .filter(|(prefix, _)| category_matches(prefix, event.event_type))
                .map(|(_, e)| e.handler.clone());
            let global = listeners.global.iter().map(|e| e.handler.clone());
            typed.chain(category).chain(global).collect()
        };

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            handlers = handlers.len(),
            "dispatching event"
        );

        let futures = handlers
            .into_iter()
            .map(|handler| {
                let event = event.clone();
                async move { handler.handle(event).await }
            })
            .collect::<Vec<_>>();

        join_all(futures)
            .await
            .into_iter()
            .map(|result| match result {
                Ok(handler_result) => handler_result,
                Err(err) => {
                    // Fault isolation: one broken observer never blocks
                    // the pipeline.
                    tracing::warn!(event_type = %event.event_type, error = %err, "event handler failed");
                    HandlerResult::none()
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read().unwrap();
        f.debug_struct("EventRegistry")
            .field("typed", &listeners.by_type.len())
            .field("category", &listeners.by_category.len())
            .field("global", &listeners.global.len())
            .finish()
    }
}

fn category_matches(prefix: &str, event_type: EventType) -> bool {
    // Accept both "tool" and "tool:" spellings.
    let bare = prefix.strip_suffix(':').unwrap_or(prefix);
    event_type.category() == bare
}

fn wrap_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(Arc<AgentEvent>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = anyhow::Result<HandlerResult>> + Send + 'static,
{
    Arc::new(FnHandler::new(move |event| {
        let fut: BoxFuture<'static, anyhow::Result<HandlerResult>> = f(event).boxed();
        fut
    }))
}
