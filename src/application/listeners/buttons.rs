use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use crate::domain::entities::ButtonClick;
use super::registry::panic_message;

pub type ButtonCallback = Arc<dyn Fn(&ButtonClick) + Send + Sync>;

/// Callbacks for interactive button clicks.
///
/// Kept apart from the main listener registry so commands can attach
/// callbacks for the buttons they post without seeing every other event.
#[derive(Default)]
pub struct ButtonListeners {
    callbacks: RwLock<Vec<ButtonCallback>>,
}

impl ButtonListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, callback: F)
    where
        F: Fn(&ButtonClick) + Send + Sync + 'static,
    {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    pub fn len(&self) -> usize {
        self.callbacks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every callback in order. Returns how many panicked.
    pub fn notify(&self, click: &ButtonClick) -> usize {
        let callbacks = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut failed = 0;
        for callback in callbacks {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(click))) {
                failed += 1;
                tracing::warn!(button = %click.custom_id, "Button callback panicked: {}", panic_message(payload));
            }
        }
        failed
    }
}
