//! mainframe-bot - event orchestration core for a chat-platform bot
//!
//! Inbound platform events fan out through a [`ListenerRegistry`] to core
//! services and dynamically loaded plugins. A timer expires temporary
//! restrictions against the platform, and reaction roles are kept in sync
//! with the store's mappings.
//!
//! [`ListenerRegistry`]: application::listeners::ListenerRegistry

pub mod application;
pub mod bot;
pub mod domain;
pub mod infrastructure;

pub use bot::Bot;
