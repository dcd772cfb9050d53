use std::sync::Arc;
use crate::application::listeners::{ButtonListeners, ListenerRegistry};
use crate::domain::traits::{Platform, Store};

/// Handle to the host passed to every plugin constructor.
///
/// Cheap to clone. Plugins keep whatever parts they need; listeners they
/// register stay registered for the rest of the process.
#[derive(Clone)]
pub struct PluginContext {
    store: Arc<dyn Store>,
    platform: Arc<dyn Platform>,
    listeners: Arc<ListenerRegistry>,
    buttons: Arc<ButtonListeners>,
}

impl PluginContext {
    pub fn new(
        store: Arc<dyn Store>,
        platform: Arc<dyn Platform>,
        listeners: Arc<ListenerRegistry>,
        buttons: Arc<ButtonListeners>,
    ) -> Self {
        Self {
            store,
            platform,
            listeners,
            buttons,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn buttons(&self) -> &ButtonListeners {
        &self.buttons
    }
}
