//! Reaction-driven role grants and revocations

mod common;

use chrono::{Duration, Utc};
use common::{Fixture, GAMER_ROLE, GUILD, MEMBER};
use mainframe_bot::application::services::{ReactionOutcome, ReactionRoles};
use mainframe_bot::domain::entities::{ChannelId, MessageId, Reaction, ReactionKey, RoleId};
use mainframe_bot::domain::traits::Store;
use mainframe_bot::infrastructure::adapters::PlatformAction;

const ROLE_MESSAGE: MessageId = MessageId(555);

fn reaction(emoji: &str) -> Reaction {
    Reaction {
        guild: GUILD,
        channel: ChannelId(10),
        message: ROLE_MESSAGE,
        user: MEMBER,
        key: ReactionKey::new(emoji),
    }
}

async fn mapped_fixture() -> (Fixture, ReactionRoles) {
    let fx = Fixture::new();
    fx.store.add_auto_role(ROLE_MESSAGE, &ReactionKey::new("🎮"), GAMER_ROLE).await.unwrap();
    let sync = ReactionRoles::new(fx.store(), fx.platform());
    (fx, sync)
}

#[tokio::test]
async fn test_reaction_grants_mapped_role() {
    let (fx, sync) = mapped_fixture().await;

    let outcome = sync.on_added(&reaction("🎮")).await.unwrap();

    assert_eq!(outcome, ReactionOutcome::Granted(GAMER_ROLE));
    assert_eq!(
        fx.platform.actions(),
        vec![PlatformAction::AddRole { guild: GUILD, user: MEMBER, role: GAMER_ROLE }]
    );
}

#[tokio::test]
async fn test_banned_user_is_ignored() {
    let (fx, sync) = mapped_fixture().await;
    fx.store.set_banned(MEMBER, true).await.unwrap();

    assert_eq!(sync.on_added(&reaction("🎮")).await.unwrap(), ReactionOutcome::Ignored);
    assert_eq!(sync.on_removed(&reaction("🎮")).await.unwrap(), ReactionOutcome::Ignored);
    // No grant and the reaction is left in place
    assert!(fx.platform.actions().is_empty());
}

#[tokio::test]
async fn test_muted_user_reaction_is_reversed() {
    let (fx, sync) = mapped_fixture().await;
    fx.store
        .add_restriction(GUILD, MEMBER, Utc::now() + Duration::minutes(10), &[])
        .await
        .unwrap();

    let outcome = sync.on_added(&reaction("🎮")).await.unwrap();

    assert_eq!(outcome, ReactionOutcome::Reversed);
    assert_eq!(fx.platform.actions(), vec![PlatformAction::RemoveReaction(reaction("🎮"))]);
}

#[tokio::test]
async fn test_expired_mute_does_not_block_grant() {
    let (fx, sync) = mapped_fixture().await;
    fx.store
        .add_restriction(GUILD, MEMBER, Utc::now() - Duration::minutes(10), &[])
        .await
        .unwrap();

    assert_eq!(sync.on_added(&reaction("🎮")).await.unwrap(), ReactionOutcome::Granted(GAMER_ROLE));
    assert_eq!(fx.platform.actions().len(), 1);
}

#[tokio::test]
async fn test_removal_revokes_even_when_muted() {
    let (fx, sync) = mapped_fixture().await;
    fx.store
        .add_restriction(GUILD, MEMBER, Utc::now() + Duration::minutes(10), &[])
        .await
        .unwrap();

    let outcome = sync.on_removed(&reaction("🎮")).await.unwrap();

    assert_eq!(outcome, ReactionOutcome::Revoked(GAMER_ROLE));
    assert_eq!(
        fx.platform.actions(),
        vec![PlatformAction::RemoveRole { guild: GUILD, user: MEMBER, role: GAMER_ROLE }]
    );
}

#[tokio::test]
async fn test_unmapped_reaction_is_ignored() {
    let (fx, sync) = mapped_fixture().await;

    assert_eq!(sync.on_added(&reaction("🎲")).await.unwrap(), ReactionOutcome::Ignored);
    assert_eq!(sync.on_removed(&reaction("🎲")).await.unwrap(), ReactionOutcome::Ignored);
    assert!(fx.platform.actions().is_empty());
}

#[tokio::test]
async fn test_mapping_to_deleted_role_is_ignored() {
    let (fx, sync) = mapped_fixture().await;
    fx.store.add_auto_role(ROLE_MESSAGE, &ReactionKey::new("👻"), RoleId(404)).await.unwrap();

    assert_eq!(sync.on_added(&reaction("👻")).await.unwrap(), ReactionOutcome::Ignored);
    assert!(fx.platform.actions().is_empty());
}

#[tokio::test]
async fn test_platform_failure_surfaces_as_error() {
    let (fx, sync) = mapped_fixture().await;
    fx.platform.fail_lookups(Some("timeout"));

    assert!(sync.on_added(&reaction("🎮")).await.is_err());
    assert!(fx.platform.actions().is_empty());
}
