//! Event fan-out - Listener registry and button callbacks

pub mod buttons;
pub mod registry;

pub use buttons::ButtonListeners;
pub use registry::{DispatchReport, FnListener, Listener, ListenerRegistry};
