//! Application services - Business logic orchestration

pub mod command_service;
pub mod leveling;
pub mod membership;
pub mod message_service;
pub mod reaction_roles;
pub mod reconciler;

pub use command_service::CommandService;
pub use leveling::Leveling;
pub use membership::Membership;
pub use message_service::MessageService;
pub use reaction_roles::{ReactionOutcome, ReactionRoles};
pub use reconciler::{Reconciler, TickReport, MIN_INTERVAL};
