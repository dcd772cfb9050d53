//! Inbound platform events
//!
//! The platform client emits a closed set of event kinds. Everything that
//! reacts to the platform (core services and plugins alike) receives one of
//! these through the listener registry.

use super::{ChannelId, GuildId, Message, MessageId, ReactionKey, User, UserId};

/// A reaction placed on (or taken off) a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub guild: GuildId,
    pub channel: ChannelId,
    pub message: MessageId,
    pub user: UserId,
    pub key: ReactionKey,
}

/// A click on an interactive message button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonClick {
    pub guild: Option<GuildId>,
    pub channel: ChannelId,
    pub message: MessageId,
    pub user: UserId,
    pub custom_id: String,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// The client finished connecting; `user` is the bot account
    Ready { user: User },
    MemberJoined { guild: GuildId, user: User },
    /// The bot was added to a guild
    GuildJoined { guild: GuildId },
    MessageReceived(Message),
    ReactionAdded(Reaction),
    ReactionRemoved(Reaction),
    ButtonClicked(ButtonClick),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Ready { .. } => "ready",
            Event::MemberJoined { .. } => "member-joined",
            Event::GuildJoined { .. } => "guild-joined",
            Event::MessageReceived(_) => "message-received",
            Event::ReactionAdded(_) => "reaction-added",
            Event::ReactionRemoved(_) => "reaction-removed",
            Event::ButtonClicked(_) => "button-clicked",
        }
    }
}
