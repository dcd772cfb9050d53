//! Plugin system for mainframe-bot
//! 
//! Plugins are dynamic libraries dropped into the plugins directory. Each
//! exports one well-known constructor symbol (see [`declare_plugin!`]) that
//! builds an implementation of the `Plugin` trait from a [`PluginContext`].
//!
//! [`declare_plugin!`]: crate::declare_plugin

pub mod context;
pub mod loader;
pub mod registry;

pub use context::PluginContext;
pub use loader::{DynamicLibraryOpener, LoadedPlugin, OpenedPlugin, PluginLoader, PluginOpener, ENTRY_SYMBOL};
pub use registry::PluginRegistry;
