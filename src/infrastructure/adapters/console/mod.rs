//! Console adapter for development/testing
//!
//! Keeps guilds, members and roles in memory and applies queued actions to
//! that state immediately. Every action is also appended to a log so tests
//! can assert exactly which requests were issued.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::application::errors::PlatformError;
use crate::domain::entities::{ChannelId, Guild, GuildId, Member, Reaction, Role, RoleId, User, UserId};
use crate::domain::traits::Platform;

/// A request issued through the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformAction {
    ModifyRoles { guild: GuildId, user: UserId, roles: Vec<RoleId> },
    AddRole { guild: GuildId, user: UserId, role: RoleId },
    RemoveRole { guild: GuildId, user: UserId, role: RoleId },
    RemoveReaction(Reaction),
    SendMessage { channel: ChannelId, text: String },
}

#[derive(Debug, Default)]
struct GuildState {
    name: String,
    roles: BTreeMap<RoleId, String>,
    members: HashMap<UserId, Member>,
}

#[derive(Debug, Clone)]
enum LookupFailure {
    Network(String),
    RateLimited(u64),
}

#[derive(Debug, Default)]
struct State {
    guilds: HashMap<GuildId, GuildState>,
    actions: Vec<PlatformAction>,
    lookup_failure: Option<LookupFailure>,
}

/// In-process platform for local development
pub struct ConsoleAdapter {
    user: User,
    echo: bool,
    state: Mutex<State>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            user: User::new(1).with_username("mainframe").bot(),
            echo: false,
            state: Mutex::new(State::default()),
        }
    }

    /// Print outgoing messages to stdout
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_guild(&self, id: GuildId, name: impl Into<String>) {
        self.state().guilds.entry(id).or_default().name = name.into();
    }

    pub fn remove_guild(&self, id: GuildId) {
        self.state().guilds.remove(&id);
    }

    pub fn create_role(&self, guild: GuildId, role: RoleId, name: impl Into<String>) {
        self.state().guilds.entry(guild).or_default().roles.insert(role, name.into());
    }

    pub fn add_member(&self, guild: GuildId, user: User, roles: Vec<RoleId>) {
        let member = Member { guild, user: user.clone(), roles };
        self.state().guilds.entry(guild).or_default().members.insert(user.id, member);
    }

    pub fn remove_member(&self, guild: GuildId, user: UserId) {
        if let Some(state) = self.state().guilds.get_mut(&guild) {
            state.members.remove(&user);
        }
    }

    /// Make every lookup fail with a network error until cleared
    pub fn fail_lookups(&self, reason: Option<&str>) {
        self.state().lookup_failure = reason.map(|r| LookupFailure::Network(r.to_string()));
    }

    /// Make every lookup report a rate limit until cleared with `fail_lookups(None)`
    pub fn rate_limit_lookups(&self, retry_after_ms: u64) {
        self.state().lookup_failure = Some(LookupFailure::RateLimited(retry_after_ms));
    }

    /// Current roles of a member, if present
    pub fn member_roles(&self, guild: GuildId, user: UserId) -> Option<Vec<RoleId>> {
        self.state()
            .guilds
            .get(&guild)
            .and_then(|g| g.members.get(&user))
            .map(|m| m.roles.clone())
    }

    /// Every action issued so far, oldest first
    pub fn actions(&self) -> Vec<PlatformAction> {
        self.state().actions.clone()
    }

    pub fn clear_actions(&self) {
        self.state().actions.clear();
    }

    fn check_lookup(&self) -> Result<(), PlatformError> {
        match &self.state().lookup_failure {
            Some(LookupFailure::Network(reason)) => Err(PlatformError::Network(reason.clone())),
            Some(LookupFailure::RateLimited(retry_after_ms)) => Err(PlatformError::RateLimited {
                retry_after_ms: *retry_after_ms,
            }),
            None => Ok(()),
        }
    }

    fn record(&self, action: PlatformAction) {
        let mut state = self.state();
        match &action {
            PlatformAction::ModifyRoles { guild, user, roles } => {
                if let Some(member) = state.guilds.get_mut(guild).and_then(|g| g.members.get_mut(user)) {
                    member.roles = roles.clone();
                }
            }
            PlatformAction::AddRole { guild, user, role } => {
                if let Some(member) = state.guilds.get_mut(guild).and_then(|g| g.members.get_mut(user)) {
                    if !member.roles.contains(role) {
                        member.roles.push(*role);
                    }
                }
            }
            PlatformAction::RemoveRole { guild, user, role } => {
                if let Some(member) = state.guilds.get_mut(guild).and_then(|g| g.members.get_mut(user)) {
                    member.roles.retain(|r| r != role);
                }
            }
            PlatformAction::RemoveReaction(_) => {}
            PlatformAction::SendMessage { text, .. } => {
                if self.echo {
                    println!("[BOT] {}", text);
                }
            }
        }
        tracing::debug!(?action, "Platform request queued");
        state.actions.push(action);
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for ConsoleAdapter {
    fn self_user(&self) -> User {
        self.user.clone()
    }

    async fn guild(&self, id: GuildId) -> Result<Option<Guild>, PlatformError> {
        self.check_lookup()?;
        Ok(self.state().guilds.get(&id).map(|g| Guild { id, name: g.name.clone() }))
    }

    async fn member(&self, guild: GuildId, user: UserId) -> Result<Option<Member>, PlatformError> {
        self.check_lookup()?;
        Ok(self
            .state()
            .guilds
            .get(&guild)
            .and_then(|g| g.members.get(&user))
            .cloned())
    }

    async fn role(&self, guild: GuildId, role: RoleId) -> Result<Option<Role>, PlatformError> {
        self.check_lookup()?;
        Ok(self
            .state()
            .guilds
            .get(&guild)
            .and_then(|g| g.roles.get(&role))
            .map(|name| Role { id: role, guild, name: name.clone() }))
    }

    async fn guild_members(&self, guild: GuildId) -> Result<Vec<User>, PlatformError> {
        self.check_lookup()?;
        let mut users: Vec<User> = self
            .state()
            .guilds
            .get(&guild)
            .map(|g| g.members.values().map(|m| m.user.clone()).collect())
            .unwrap_or_default();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    fn modify_member_roles(&self, guild: GuildId, user: UserId, roles: Vec<RoleId>) {
        self.record(PlatformAction::ModifyRoles { guild, user, roles });
    }

    fn add_role(&self, guild: GuildId, user: UserId, role: RoleId) {
        self.record(PlatformAction::AddRole { guild, user, role });
    }

    fn remove_role(&self, guild: GuildId, user: UserId, role: RoleId) {
        self.record(PlatformAction::RemoveRole { guild, user, role });
    }

    fn remove_reaction(&self, reaction: &Reaction) {
        self.record(PlatformAction::RemoveReaction(reaction.clone()));
    }

    fn send_message(&self, channel: ChannelId, text: &str) {
        self.record(PlatformAction::SendMessage { channel, text: text.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookups_distinguish_missing_from_failing() {
        let platform = ConsoleAdapter::new();
        platform.add_guild(GuildId(1), "home");
        platform.add_member(GuildId(1), User::new(2), vec![]);

        assert!(platform.guild(GuildId(1)).await.unwrap().is_some());
        assert!(platform.guild(GuildId(9)).await.unwrap().is_none());
        assert!(platform.member(GuildId(1), UserId(3)).await.unwrap().is_none());

        platform.fail_lookups(Some("gateway down"));
        assert!(matches!(platform.guild(GuildId(1)).await, Err(PlatformError::Network(_))));
        platform.rate_limit_lookups(250);
        assert!(matches!(
            platform.member(GuildId(1), UserId(2)).await,
            Err(PlatformError::RateLimited { retry_after_ms: 250 })
        ));
        platform.fail_lookups(None);
        assert!(platform.guild(GuildId(1)).await.is_ok());
    }

    #[test]
    fn test_actions_update_member_roles() {
        let platform = ConsoleAdapter::new();
        platform.add_member(GuildId(1), User::new(2), vec![RoleId(5)]);

        platform.add_role(GuildId(1), UserId(2), RoleId(6));
        platform.add_role(GuildId(1), UserId(2), RoleId(6));
        assert_eq!(platform.member_roles(GuildId(1), UserId(2)), Some(vec![RoleId(5), RoleId(6)]));

        platform.remove_role(GuildId(1), UserId(2), RoleId(5));
        assert_eq!(platform.member_roles(GuildId(1), UserId(2)), Some(vec![RoleId(6)]));

        platform.modify_member_roles(GuildId(1), UserId(2), vec![RoleId(7)]);
        assert_eq!(platform.member_roles(GuildId(1), UserId(2)), Some(vec![RoleId(7)]));
        assert_eq!(platform.actions().len(), 4);
    }
}
