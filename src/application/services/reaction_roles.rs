//! Reaction roles - self-assigned roles by reacting to a message

use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use crate::application::errors::BotError;
use crate::application::listeners::Listener;
use crate::domain::entities::{Event, Reaction, RoleId};
use crate::domain::traits::{Platform, Store};

/// What the synchronizer did with one reaction event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// Banned user, unmapped reaction, or a role that no longer exists
    Ignored,
    Granted(RoleId),
    Revoked(RoleId),
    /// The user is muted; their reaction was taken back and no role granted
    Reversed,
}

/// Grants a mapped role when a reaction is added and revokes it when the
/// reaction is removed.
///
/// Role changes are fire-and-forget requests; nothing here waits for them
/// or retries them.
pub struct ReactionRoles {
    store: Arc<dyn Store>,
    platform: Arc<dyn Platform>,
}

impl ReactionRoles {
    pub fn new(store: Arc<dyn Store>, platform: Arc<dyn Platform>) -> Self {
        Self { store, platform }
    }

    pub async fn on_added(&self, reaction: &Reaction) -> Result<ReactionOutcome, BotError> {
        let Some(role) = self.mapped_role(reaction).await? else {
            return Ok(ReactionOutcome::Ignored);
        };

        // Muted members aren't eligible for reaction roles
        let mute = self.store.find_mute(reaction.user, reaction.guild).await?;
        if mute.is_some_and(|m| m.is_active(Utc::now())) {
            tracing::debug!(user = %reaction.user, guild = %reaction.guild, "Muted user reacted, reversing");
            self.platform.remove_reaction(reaction);
            return Ok(ReactionOutcome::Reversed);
        }

        self.platform.add_role(reaction.guild, reaction.user, role);
        Ok(ReactionOutcome::Granted(role))
    }

    pub async fn on_removed(&self, reaction: &Reaction) -> Result<ReactionOutcome, BotError> {
        let Some(role) = self.mapped_role(reaction).await? else {
            return Ok(ReactionOutcome::Ignored);
        };

        self.platform.remove_role(reaction.guild, reaction.user, role);
        Ok(ReactionOutcome::Revoked(role))
    }

    /// Role for this reaction, if the user isn't banned and the mapping
    /// points at a role that still exists
    async fn mapped_role(&self, reaction: &Reaction) -> Result<Option<RoleId>, BotError> {
        if self.store.banned(reaction.user).await? {
            return Ok(None);
        }
        let Some(role_id) = self.store.auto_role(reaction.message, &reaction.key).await? else {
            return Ok(None);
        };
        let role = self.platform.role(reaction.guild, role_id).await?;
        Ok(role.map(|r| r.id))
    }
}

#[async_trait]
impl Listener for ReactionRoles {
    fn name(&self) -> &str {
        "reaction-roles"
    }

    async fn on_event(&self, event: &Event) -> Result<(), BotError> {
        let outcome = match event {
            Event::ReactionAdded(reaction) => self.on_added(reaction).await?,
            Event::ReactionRemoved(reaction) => self.on_removed(reaction).await?,
            _ => return Ok(()),
        };
        tracing::trace!(?outcome, "Reaction handled");
        Ok(())
    }
}
