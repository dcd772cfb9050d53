use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::application::errors::StorageError;
use crate::domain::entities::{GuildId, MessageId, ReactionKey, Restriction, RoleId, UserId};

/// Store trait - abstraction for data persistence.
///
/// The store is the single source of truth for restrictions, bans and
/// reaction-role mappings. Implementations must tolerate concurrent use from
/// the reconciliation timer and the event path.
#[async_trait]
pub trait Store: Send + Sync {
    // Restrictions
    /// Restrictions whose end has passed and that have not been removed yet
    async fn expiring_restrictions(&self) -> Result<Vec<Restriction>, StorageError>;
    /// Deletes the record together with its saved roles. Removing a record
    /// that no longer exists is a no-op.
    async fn remove_restriction(&self, restriction: &Restriction) -> Result<(), StorageError>;
    /// Roles the member held before the restriction started
    async fn role_ids_for(&self, restriction: &Restriction) -> Result<Vec<RoleId>, StorageError>;
    async fn find_mute(&self, user: UserId, guild: GuildId) -> Result<Option<Restriction>, StorageError>;
    async fn add_restriction(
        &self,
        guild: GuildId,
        user: UserId,
        end: DateTime<Utc>,
        roles: &[RoleId],
    ) -> Result<Restriction, StorageError>;

    // Membership and bans
    async fn add_link(&self, guild: GuildId, user: UserId) -> Result<(), StorageError>;
    async fn banned(&self, user: UserId) -> Result<bool, StorageError>;
    async fn set_banned(&self, user: UserId, banned: bool) -> Result<(), StorageError>;

    // Reaction roles
    async fn auto_role(&self, message: MessageId, reaction: &ReactionKey) -> Result<Option<RoleId>, StorageError>;
    async fn add_auto_role(&self, message: MessageId, reaction: &ReactionKey, role: RoleId) -> Result<(), StorageError>;

    // Leveling
    async fn add_points(&self, guild: GuildId, user: UserId, points: f64) -> Result<f64, StorageError>;
    async fn points(&self, guild: GuildId, user: UserId) -> Result<f64, StorageError>;
}
