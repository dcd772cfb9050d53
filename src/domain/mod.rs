//! Domain layer - Core business objects with no external dependencies
//! 
//! This layer contains:
//! - Entities: Identifiers, events, restrictions, commands
//! - Traits: Abstractions for collaborators (Platform, Store, Plugin)

pub mod entities;
pub mod traits;
