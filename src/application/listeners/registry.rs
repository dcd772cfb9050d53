//! Listener registry - fans every inbound event out to all listeners

use std::sync::{Arc, PoisonError, RwLock};
use async_trait::async_trait;
use crate::application::errors::{error_chain, BotError};
use crate::domain::entities::Event;

/// Something that reacts to platform events.
///
/// Listeners see every event kind and ignore the ones they don't care about.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn on_event(&self, event: &Event) -> Result<(), BotError>;
}

/// Adapts a plain closure into a [`Listener`]
pub struct FnListener<F> {
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&Event) -> Result<(), BotError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F> Listener for FnListener<F>
where
    F: Fn(&Event) -> Result<(), BotError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_event(&self, event: &Event) -> Result<(), BotError> {
        (self.handler)(event)
    }
}

/// Outcome of dispatching one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub invoked: usize,
    pub failed: usize,
}

/// Ordered, append-only collection of listeners.
///
/// Registration is permanent for the lifetime of the process. Dispatch runs
/// listeners one after another in registration order; a listener that
/// returns an error or panics is logged and the next one still runs.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<Arc<dyn Listener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Arc<dyn Listener>) {
        tracing::debug!(listener = listener.name(), "Registered listener");
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn register_fn<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Event) -> Result<(), BotError> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnListener::new(name, handler)));
    }

    pub fn len(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every registered listener.
    ///
    /// Each listener runs on its own task so a panic stays contained; the
    /// task is awaited before the next listener starts.
    pub async fn dispatch(&self, event: Event) -> DispatchReport {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let event = Arc::new(event);
        let mut report = DispatchReport::default();

        for listener in listeners {
            report.invoked += 1;
            let name = listener.name().to_string();
            let task_event = Arc::clone(&event);
            let outcome = tokio::spawn(async move { listener.on_event(&task_event).await }).await;

            let err = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(join) if join.is_panic() => BotError::Panicked(panic_message(join.into_panic())),
                Err(join) => BotError::Internal(join.to_string()),
            };
            report.failed += 1;
            tracing::warn!(
                listener = %name,
                event = event.kind(),
                "Listener failed: {}",
                error_chain(&err)
            );
        }

        report
    }
}

pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
