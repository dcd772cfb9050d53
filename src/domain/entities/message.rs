use super::{ChannelId, GuildId, MessageId, User};
use chrono::{DateTime, Utc};

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Empty,
}

impl Content {
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Content::Command { .. })
    }
}

/// A message posted in a guild channel
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub guild: GuildId,
    pub channel: ChannelId,
    pub author: User,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: MessageId, guild: GuildId, channel: ChannelId, author: User, content: Content) -> Self {
        Self {
            id,
            guild,
            channel,
            author,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn from_text(
        id: MessageId,
        guild: GuildId,
        channel: ChannelId,
        author: User,
        text: impl Into<String>,
    ) -> Self {
        Self::new(id, guild, channel, author, Content::Text(text.into()))
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
