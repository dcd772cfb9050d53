use super::{GuildId, RoleId, User};

/// A guild as seen by the platform client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
}

/// A user's membership in one guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub guild: GuildId,
    pub user: User,
    pub roles: Vec<RoleId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub guild: GuildId,
    pub name: String,
}
