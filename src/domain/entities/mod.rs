//! Domain entities - Core business objects with no external dependencies

pub mod ids;
pub mod user;
pub mod guild;
pub mod message;
pub mod event;
pub mod restriction;
pub mod command;

pub use ids::{ChannelId, GuildId, MessageId, ReactionKey, RoleId, UserId};
pub use user::User;
pub use guild::{Guild, Member, Role};
pub use message::{Message, Content};
pub use event::{ButtonClick, Event, Reaction};
pub use restriction::{human_duration, Restriction};
pub use command::{Command, CommandRegistry};
