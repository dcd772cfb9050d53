use std::sync::Arc;
use async_trait::async_trait;
use crate::application::errors::BotError;
use crate::application::listeners::Listener;
use crate::domain::entities::{Event, GuildId};
use crate::domain::traits::{Platform, Store};

/// Records which users belong to which guilds
pub struct Membership {
    store: Arc<dyn Store>,
    platform: Arc<dyn Platform>,
}

impl Membership {
    pub fn new(store: Arc<dyn Store>, platform: Arc<dyn Platform>) -> Self {
        Self { store, platform }
    }

    /// Link every current member of a newly joined guild
    pub async fn link_guild(&self, guild: GuildId) -> Result<usize, BotError> {
        let members = self.platform.guild_members(guild).await?;
        for user in &members {
            self.store.add_link(guild, user.id).await?;
        }
        tracing::info!(guild = %guild, members = members.len(), "Joined guild");
        Ok(members.len())
    }
}

#[async_trait]
impl Listener for Membership {
    fn name(&self) -> &str {
        "membership"
    }

    async fn on_event(&self, event: &Event) -> Result<(), BotError> {
        match event {
            Event::MemberJoined { guild, user } => {
                self.store.add_link(*guild, user.id).await?;
            }
            Event::GuildJoined { guild } => {
                self.link_guild(*guild).await?;
            }
            _ => {}
        }
        Ok(())
    }
}
