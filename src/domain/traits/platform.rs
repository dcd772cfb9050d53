use async_trait::async_trait;
use crate::domain::entities::{ChannelId, Guild, GuildId, Member, Reaction, Role, RoleId, User, UserId};
use crate::application::errors::PlatformError;

/// Platform trait - abstraction over the chat platform client.
///
/// Lookups distinguish "the entity is gone" (`Ok(None)`) from a failed call
/// (`Err`). Callers treat only the former as final.
///
/// Mutating operations are fire-and-forget: they queue a request with the
/// client and return immediately. Failures surface in the client's own logs.
#[async_trait]
pub trait Platform: Send + Sync {
    /// The account the bot is logged in as
    fn self_user(&self) -> User;

    async fn guild(&self, id: GuildId) -> Result<Option<Guild>, PlatformError>;

    async fn member(&self, guild: GuildId, user: UserId) -> Result<Option<Member>, PlatformError>;

    async fn role(&self, guild: GuildId, role: RoleId) -> Result<Option<Role>, PlatformError>;

    /// Every member of a guild, loading them from the platform if needed
    async fn guild_members(&self, guild: GuildId) -> Result<Vec<User>, PlatformError>;

    /// Replace the member's complete role set
    fn modify_member_roles(&self, guild: GuildId, user: UserId, roles: Vec<RoleId>);

    fn add_role(&self, guild: GuildId, user: UserId, role: RoleId);

    fn remove_role(&self, guild: GuildId, user: UserId, role: RoleId);

    /// Take the user's reaction off the message again
    fn remove_reaction(&self, reaction: &Reaction);

    fn send_message(&self, channel: ChannelId, text: &str);
}
