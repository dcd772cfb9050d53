//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Once};
use mainframe_bot::domain::entities::{GuildId, RoleId, User, UserId};
use mainframe_bot::domain::traits::{Platform, Store};
use mainframe_bot::infrastructure::adapters::ConsoleAdapter;
use mainframe_bot::infrastructure::database::SqliteStore;

pub const GUILD: GuildId = GuildId(100);
pub const MEMBER: UserId = UserId(200);
pub const MODERATOR_ROLE: RoleId = RoleId(300);
pub const GAMER_ROLE: RoleId = RoleId(301);

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub struct Fixture {
    pub store: Arc<SqliteStore>,
    pub platform: Arc<ConsoleAdapter>,
}

impl Fixture {
    /// One guild with two roles and one member holding no roles
    pub fn new() -> Self {
        ensure_init();
        let store = Arc::new(SqliteStore::in_memory().expect("in-memory store"));
        let platform = Arc::new(ConsoleAdapter::new());
        platform.add_guild(GUILD, "test guild");
        platform.create_role(GUILD, MODERATOR_ROLE, "moderator");
        platform.create_role(GUILD, GAMER_ROLE, "gamer");
        platform.add_member(GUILD, User::new(MEMBER.get()).with_username("member"), Vec::new());
        Self { store, platform }
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    pub fn platform(&self) -> Arc<dyn Platform> {
        self.platform.clone()
    }
}
