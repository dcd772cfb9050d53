//! Reconciliation of expired restrictions

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::{Fixture, GAMER_ROLE, GUILD, MEMBER, MODERATOR_ROLE};
use mainframe_bot::application::errors::StorageError;
use mainframe_bot::application::services::{Reconciler, TickReport, MIN_INTERVAL};
use mainframe_bot::domain::entities::{GuildId, MessageId, ReactionKey, Restriction, RoleId, UserId};
use mainframe_bot::domain::traits::Store;
use mainframe_bot::infrastructure::adapters::PlatformAction;
use mainframe_bot::infrastructure::database::SqliteStore;

fn reconciler(fx: &Fixture) -> Reconciler {
    Reconciler::new(fx.store(), fx.platform(), StdDuration::from_secs(15))
}

fn expired() -> chrono::DateTime<Utc> {
    Utc::now() - Duration::minutes(5)
}

#[tokio::test]
async fn test_expired_restriction_restores_roles_once() {
    let fx = Fixture::new();
    fx.store
        .add_restriction(GUILD, MEMBER, expired(), &[MODERATOR_ROLE, GAMER_ROLE])
        .await
        .unwrap();
    let reconciler = reconciler(&fx);

    let first = reconciler.tick().await;
    assert_eq!(first, TickReport { due: 1, restored: 1, gone: 0, retried: 0 });
    assert_eq!(
        fx.platform.actions(),
        vec![PlatformAction::ModifyRoles {
            guild: GUILD,
            user: MEMBER,
            roles: vec![MODERATOR_ROLE, GAMER_ROLE],
        }]
    );
    assert_eq!(fx.platform.member_roles(GUILD, MEMBER), Some(vec![MODERATOR_ROLE, GAMER_ROLE]));

    // The record is gone, so nothing happens on the next tick
    let second = reconciler.tick().await;
    assert_eq!(second, TickReport::default());
    assert_eq!(fx.platform.actions().len(), 1);
    assert!(fx.store.find_mute(MEMBER, GUILD).await.unwrap().is_none());
}

#[tokio::test]
async fn test_member_left_deletes_without_restore() {
    let fx = Fixture::new();
    fx.store.add_restriction(GUILD, MEMBER, expired(), &[MODERATOR_ROLE]).await.unwrap();
    fx.platform.remove_member(GUILD, MEMBER);

    let report = reconciler(&fx).tick().await;

    assert_eq!(report, TickReport { due: 1, restored: 0, gone: 1, retried: 0 });
    assert!(fx.platform.actions().is_empty());
    assert!(fx.store.expiring_restrictions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_guild_removed_deletes_without_restore() {
    let fx = Fixture::new();
    fx.store.add_restriction(GuildId(999), UserId(1), expired(), &[RoleId(1)]).await.unwrap();

    let report = reconciler(&fx).tick().await;

    assert_eq!(report.gone, 1);
    assert!(fx.platform.actions().is_empty());
    assert!(fx.store.expiring_restrictions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transient_failure_leaves_record_for_retry() {
    let fx = Fixture::new();
    fx.store.add_restriction(GUILD, MEMBER, expired(), &[GAMER_ROLE]).await.unwrap();
    let reconciler = reconciler(&fx);

    fx.platform.fail_lookups(Some("gateway unavailable"));
    let failed = reconciler.tick().await;
    assert_eq!(failed, TickReport { due: 1, restored: 0, gone: 0, retried: 1 });
    assert!(fx.platform.actions().is_empty());
    assert_eq!(fx.store.expiring_restrictions().await.unwrap().len(), 1);

    fx.platform.fail_lookups(None);
    let retried = reconciler.tick().await;
    assert_eq!(retried.restored, 1);
    assert_eq!(fx.platform.actions().len(), 1);
    assert!(fx.store.expiring_restrictions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_active_restriction_is_left_alone() {
    let fx = Fixture::new();
    fx.store
        .add_restriction(GUILD, MEMBER, Utc::now() + Duration::hours(1), &[GAMER_ROLE])
        .await
        .unwrap();

    assert_eq!(reconciler(&fx).tick().await, TickReport::default());
    assert!(fx.store.find_mute(MEMBER, GUILD).await.unwrap().is_some());
}

#[tokio::test]
async fn test_deleted_roles_are_skipped() {
    let fx = Fixture::new();
    fx.store
        .add_restriction(GUILD, MEMBER, expired(), &[GAMER_ROLE, RoleId(404)])
        .await
        .unwrap();

    reconciler(&fx).tick().await;

    assert_eq!(
        fx.platform.actions(),
        vec![PlatformAction::ModifyRoles { guild: GUILD, user: MEMBER, roles: vec![GAMER_ROLE] }]
    );
}

#[tokio::test]
async fn test_timer_first_tick_is_immediate() {
    let fx = Fixture::new();
    fx.store.add_restriction(GUILD, MEMBER, expired(), &[GAMER_ROLE]).await.unwrap();

    // Interval far longer than the test; only the immediate tick can run
    let reconciler = Arc::new(Reconciler::new(fx.store(), fx.platform(), StdDuration::from_secs(3600)));
    let handle = reconciler.spawn();

    let mut restored = false;
    for _ in 0..100 {
        if !fx.platform.actions().is_empty() {
            restored = true;
            break;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    handle.abort();

    assert!(restored, "first tick should run without waiting for the interval");
    assert!(fx.store.expiring_restrictions().await.unwrap().is_empty());
}

/// SQLite store whose deletes can be made to fail
struct FailingDeletes {
    inner: Arc<SqliteStore>,
    fail: AtomicBool,
}

#[async_trait]
impl Store for FailingDeletes {
    async fn expiring_restrictions(&self) -> Result<Vec<Restriction>, StorageError> {
        self.inner.expiring_restrictions().await
    }

    async fn remove_restriction(&self, restriction: &Restriction) -> Result<(), StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::InvalidRecord("disk I/O error".to_string()));
        }
        self.inner.remove_restriction(restriction).await
    }

    async fn role_ids_for(&self, restriction: &Restriction) -> Result<Vec<RoleId>, StorageError> {
        self.inner.role_ids_for(restriction).await
    }

    async fn find_mute(&self, user: UserId, guild: GuildId) -> Result<Option<Restriction>, StorageError> {
        self.inner.find_mute(user, guild).await
    }

    async fn add_restriction(
        &self,
        guild: GuildId,
        user: UserId,
        end: DateTime<Utc>,
        roles: &[RoleId],
    ) -> Result<Restriction, StorageError> {
        self.inner.add_restriction(guild, user, end, roles).await
    }

    async fn add_link(&self, guild: GuildId, user: UserId) -> Result<(), StorageError> {
        self.inner.add_link(guild, user).await
    }

    async fn banned(&self, user: UserId) -> Result<bool, StorageError> {
        self.inner.banned(user).await
    }

    async fn set_banned(&self, user: UserId, banned: bool) -> Result<(), StorageError> {
        self.inner.set_banned(user, banned).await
    }

    async fn auto_role(&self, message: MessageId, reaction: &ReactionKey) -> Result<Option<RoleId>, StorageError> {
        self.inner.auto_role(message, reaction).await
    }

    async fn add_auto_role(&self, message: MessageId, reaction: &ReactionKey, role: RoleId) -> Result<(), StorageError> {
        self.inner.add_auto_role(message, reaction, role).await
    }

    async fn add_points(&self, guild: GuildId, user: UserId, points: f64) -> Result<f64, StorageError> {
        self.inner.add_points(guild, user, points).await
    }

    async fn points(&self, guild: GuildId, user: UserId) -> Result<f64, StorageError> {
        self.inner.points(guild, user).await
    }
}

#[tokio::test]
async fn test_failed_delete_keeps_record_and_restores_again() {
    let fx = Fixture::new();
    fx.store.add_restriction(GUILD, MEMBER, expired(), &[GAMER_ROLE]).await.unwrap();
    let store = Arc::new(FailingDeletes {
        inner: Arc::clone(&fx.store),
        fail: AtomicBool::new(true),
    });
    let reconciler = Reconciler::new(store.clone(), fx.platform(), StdDuration::from_secs(15));

    let first = reconciler.tick().await;
    assert_eq!(first, TickReport { due: 1, restored: 0, gone: 0, retried: 1 });
    assert_eq!(fx.platform.actions().len(), 1);
    assert_eq!(fx.store.expiring_restrictions().await.unwrap().len(), 1);

    store.fail.store(false, Ordering::SeqCst);
    let second = reconciler.tick().await;
    assert_eq!(second, TickReport { due: 1, restored: 1, gone: 0, retried: 0 });
    let restore = PlatformAction::ModifyRoles { guild: GUILD, user: MEMBER, roles: vec![GAMER_ROLE] };
    assert_eq!(fx.platform.actions(), vec![restore.clone(), restore]);
    assert!(fx.store.expiring_restrictions().await.unwrap().is_empty());

    assert_eq!(reconciler.tick().await, TickReport::default());
}

#[tokio::test]
async fn test_rate_limited_lookup_is_retried() {
    let fx = Fixture::new();
    fx.store.add_restriction(GUILD, MEMBER, expired(), &[MODERATOR_ROLE]).await.unwrap();
    let reconciler = reconciler(&fx);

    fx.platform.rate_limit_lookups(500);
    assert_eq!(reconciler.tick().await, TickReport { due: 1, restored: 0, gone: 0, retried: 1 });
    assert!(fx.platform.actions().is_empty());
    assert!(fx.store.find_mute(MEMBER, GUILD).await.unwrap().is_some());

    fx.platform.fail_lookups(None);
    assert_eq!(reconciler.tick().await.restored, 1);
    assert_eq!(fx.platform.member_roles(GUILD, MEMBER), Some(vec![MODERATOR_ROLE]));
}

#[tokio::test]
async fn test_zero_interval_is_raised_to_minimum() {
    let fx = Fixture::new();
    fx.store.add_restriction(GUILD, MEMBER, expired(), &[GAMER_ROLE]).await.unwrap();

    let reconciler = Arc::new(Reconciler::new(fx.store(), fx.platform(), StdDuration::ZERO));
    assert_eq!(reconciler.interval(), MIN_INTERVAL);

    let handle = reconciler.spawn();
    for _ in 0..100 {
        if !fx.platform.actions().is_empty() {
            break;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }

    assert!(!handle.is_finished(), "timer task should keep running");
    handle.abort();
    assert_eq!(fx.platform.actions().len(), 1);
}
