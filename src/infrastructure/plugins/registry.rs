//! Plugin registry - Holds loaded plugins and drives their lifecycle hooks

use std::panic::{catch_unwind, AssertUnwindSafe};
use crate::application::listeners::registry::panic_message;
use crate::domain::entities::CommandRegistry;
use super::loader::LoadedPlugin;

/// Loaded plugins in load order.
///
/// Plugins are never unloaded; the registry lives as long as the bot.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<LoadedPlugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, plugin: LoadedPlugin) {
        self.plugins.push(plugin);
    }

    /// Get all plugin names
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(LoadedPlugin::name).collect()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Let every plugin add its commands
    pub fn register_commands(&self, commands: &mut CommandRegistry) {
        for plugin in &self.plugins {
            self.guarded(plugin, "register_commands", || plugin.plugin().register_commands(commands));
        }
    }

    /// Tell every plugin the bot is up
    pub fn started_all(&self) {
        for plugin in &self.plugins {
            self.guarded(plugin, "started", || plugin.plugin().started());
        }
    }

    fn guarded(&self, plugin: &LoadedPlugin, hook: &str, f: impl FnOnce()) {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
            tracing::error!(plugin = plugin.name(), hook, "Plugin hook panicked: {}", panic_message(payload));
        }
    }
}
