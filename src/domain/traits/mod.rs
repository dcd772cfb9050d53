//! Domain traits - Abstractions for infrastructure implementations

pub mod platform;
pub mod plugin;
pub mod store;

pub use platform::Platform;
pub use plugin::Plugin;
pub use store::Store;
