//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Errors: Error taxonomy shared by every layer
//! - Listeners: Event fan-out to core and plugin handlers
//! - Messaging: Command text parsing
//! - Services: Reconciliation, reaction roles, membership, messages

pub mod errors;
pub mod listeners;
pub mod messaging;
pub mod services;
