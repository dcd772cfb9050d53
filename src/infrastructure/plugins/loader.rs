//! Plugin loader - Dynamically loads plugins from shared libraries

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use libloading::{Library, Symbol};
use crate::application::errors::{error_chain, PluginError};
use crate::application::listeners::registry::panic_message;
use crate::domain::traits::Plugin;
use super::context::PluginContext;
use super::registry::PluginRegistry;

/// Symbol every plugin library exports to construct its entry point
pub const ENTRY_SYMBOL: &str = "mainframe_plugin_create";

/// Signature of [`ENTRY_SYMBOL`]. Returns null if construction failed.
pub type PluginCreateFn = unsafe extern "C" fn(&PluginContext) -> *mut Box<dyn Plugin>;

/// Exports a plugin constructor under the well-known entry symbol.
///
/// The constructor has the shape `fn(&PluginContext) -> Result<P, PluginError>`
/// where `P: Plugin + 'static`.
///
/// ```ignore
/// mainframe_bot::declare_plugin!(GreeterPlugin::new);
/// ```
#[macro_export]
macro_rules! declare_plugin {
    ($constructor:path) => {
        #[no_mangle]
        pub extern "C" fn mainframe_plugin_create(
            ctx: &$crate::infrastructure::plugins::PluginContext,
        ) -> *mut ::std::boxed::Box<dyn $crate::domain::traits::Plugin> {
            let built = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $constructor(ctx)));
            match built {
                Ok(Ok(plugin)) => {
                    let plugin: ::std::boxed::Box<dyn $crate::domain::traits::Plugin> =
                        ::std::boxed::Box::new(plugin);
                    ::std::boxed::Box::into_raw(::std::boxed::Box::new(plugin))
                }
                _ => ::std::ptr::null_mut(),
            }
        }
    };
}

/// A constructed plugin straight out of its package
pub struct OpenedPlugin {
    pub instance: Box<dyn Plugin>,
    /// Library the instance's code lives in, if any
    pub library: Option<Library>,
}

/// Opens one package and constructs its entry point.
///
/// `Ok(None)` means the package is readable but has no entry point.
pub trait PluginOpener: Send + Sync {
    fn open(&self, path: &Path, ctx: &PluginContext) -> Result<Option<OpenedPlugin>, PluginError>;
}

/// Opens packages as native dynamic libraries.
///
/// Every library gets its own handle with local symbol binding, so two
/// plugins exporting the same symbol names do not interfere.
pub struct DynamicLibraryOpener;

impl PluginOpener for DynamicLibraryOpener {
    fn open(&self, path: &Path, ctx: &PluginContext) -> Result<Option<OpenedPlugin>, PluginError> {
        // Load the library
        let library = unsafe {
            Library::new(path).map_err(|source| PluginError::Open {
                path: path.display().to_string(),
                source,
            })?
        };

        let instance = {
            // Get the entry point
            let create: Symbol<PluginCreateFn> = match unsafe { library.get(ENTRY_SYMBOL.as_bytes()) } {
                Ok(symbol) => symbol,
                Err(e) => {
                    tracing::debug!(path = %path.display(), "No plugin entry point: {}", e);
                    return Ok(None);
                }
            };

            let raw = unsafe { create(ctx) };
            if raw.is_null() {
                return Err(PluginError::Constructor("entry point returned null".to_string()));
            }
            unsafe { *Box::from_raw(raw) }
        };

        Ok(Some(OpenedPlugin {
            instance,
            library: Some(library),
        }))
    }
}

/// Loaded plugin instance
pub struct LoadedPlugin {
    name: String,
    instance: Box<dyn Plugin>,
    // Declared after `instance` so the code is unloaded only after the
    // object built from it has been dropped.
    _library: Option<Library>,
}

impl LoadedPlugin {
    /// Name derived from the package file name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin(&self) -> &dyn Plugin {
        self.instance.as_ref()
    }
}

/// Plugin loader
pub struct PluginLoader {
    plugin_dir: PathBuf,
    extension: String,
    opener: Box<dyn PluginOpener>,
}

impl PluginLoader {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            extension: std::env::consts::DLL_EXTENSION.to_string(),
            opener: Box::new(DynamicLibraryOpener),
        }
    }

    pub fn with_opener(mut self, opener: impl PluginOpener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    /// File extension that marks a package (without the dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn plugin_dir(&self) -> &Path {
        &self.plugin_dir
    }

    /// Load a single package and run its `load` hook
    pub fn load_plugin(&self, path: &Path, ctx: &PluginContext) -> Result<Option<LoadedPlugin>, PluginError> {
        let Some(opened) = self.opener.open(path, ctx)? else {
            return Ok(None);
        };

        match catch_unwind(AssertUnwindSafe(|| opened.instance.load())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(PluginError::Hook(error_chain(&e))),
            Err(payload) => return Err(PluginError::Hook(format!("panicked: {}", panic_message(payload)))),
        }

        Ok(Some(LoadedPlugin {
            name: plugin_name(path),
            instance: opened.instance,
            _library: opened.library,
        }))
    }

    /// Load every package in the plugin directory.
    ///
    /// Never fails: a missing directory is created, and a package that cannot
    /// be loaded is logged and skipped. Packages load in file name order.
    pub fn load_all(&self, ctx: &PluginContext) -> PluginRegistry {
        let mut registry = PluginRegistry::new();

        if !self.plugin_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.plugin_dir) {
                tracing::error!("Failed to create plugin directory {}: {}", self.plugin_dir.display(), e);
            }
            return registry;
        }

        let entries = match std::fs::read_dir(&self.plugin_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("{}", error_chain(&PluginError::Directory(e)));
                return registry;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(e) => Some(e.path()),
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    None
                }
            })
            .filter(|path| path.is_file() && self.is_package(path))
            .collect();
        paths.sort();

        for path in paths {
            let name = plugin_name(&path);
            match self.load_plugin(&path, ctx) {
                Ok(Some(plugin)) => {
                    tracing::info!(plugin = %name, "Loaded plugin");
                    registry.push(plugin);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(plugin = %name, "Error loading plugin '{}': {}", name, error_chain(&e));
                }
            }
        }

        registry
    }

    fn is_package(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str())
    }
}

fn plugin_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
