use crate::application::errors::PluginError;
use crate::domain::entities::CommandRegistry;

/// Extension-point contract every plugin implements.
///
/// A plugin is constructed once with a handle to the host, then driven
/// through its hooks in this order: `load` right after construction,
/// `register_commands` before the first message is dispatched, and
/// `started` once the platform client reports ready.
pub trait Plugin: Send + Sync {
    /// Called immediately after construction. An error discards the plugin.
    fn load(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once the bot is connected and ready
    fn started(&self) {}

    /// Add this plugin's commands to the shared registry
    fn register_commands(&self, _commands: &mut CommandRegistry) {}
}
