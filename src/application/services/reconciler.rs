//! Restriction reconciliation - hands roles back once a mute has expired

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use crate::application::errors::{error_chain, BotError};
use crate::domain::entities::{human_duration, Restriction};
use crate::domain::traits::{Platform, Store};

/// Shortest allowed gap between ticks
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// What happened to one due restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Revert {
    /// Role restore was requested
    Restored,
    /// Guild or member is gone, nothing left to restore
    Gone,
}

/// Counts for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub due: usize,
    pub restored: usize,
    pub gone: usize,
    /// Left in the store for the next tick
    pub retried: usize,
}

/// Periodically expires restrictions.
///
/// Each tick asks the store for the due set and, per record, restores the
/// member's saved roles and then deletes the record. A record whose guild or
/// member no longer exists is deleted without touching the platform. Any
/// other failure leaves the record in place so the next tick retries it;
/// restoring roles twice is harmless.
pub struct Reconciler {
    store: Arc<dyn Store>,
    platform: Arc<dyn Platform>,
    interval: Duration,
}

impl Reconciler {
    /// Intervals shorter than [`MIN_INTERVAL`] are raised to it
    pub fn new(store: Arc<dyn Store>, platform: Arc<dyn Platform>, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            tracing::warn!(?interval, "Reconciliation interval too short, using {:?}", MIN_INTERVAL);
        }
        let interval = interval.max(MIN_INTERVAL);
        Self {
            store,
            platform,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the timer. The first tick runs immediately.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(interval_secs = self.interval.as_secs(), "Reconciliation timer started");

            loop {
                interval.tick().await;
                let report = self.tick().await;
                if report.due > 0 {
                    tracing::debug!(
                        due = report.due,
                        restored = report.restored,
                        gone = report.gone,
                        retried = report.retried,
                        "Reconciliation tick finished"
                    );
                }
            }
        })
    }

    /// Process every restriction that is currently due
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();

        let due = match self.store.expiring_restrictions().await {
            Ok(due) => due,
            Err(e) => {
                tracing::warn!("Failed to query expiring restrictions: {}", error_chain(&e));
                return report;
            }
        };
        report.due = due.len();

        for mute in due {
            let outcome = match self.revert(&mute).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    report.retried += 1;
                    tracing::warn!(
                        guild = %mute.guild,
                        user = %mute.user,
                        "Failed to revert restriction, will retry: {}",
                        error_chain(&e)
                    );
                    continue;
                }
            };

            if let Err(e) = self.store.remove_restriction(&mute).await {
                report.retried += 1;
                tracing::error!(
                    guild = %mute.guild,
                    user = %mute.user,
                    "Failed to delete restriction, will retry: {}",
                    error_chain(&e)
                );
                continue;
            }

            match outcome {
                Revert::Restored => {
                    report.restored += 1;
                    tracing::info!(
                        guild = %mute.guild,
                        user = %mute.user,
                        overdue = %human_duration(Utc::now() - mute.end),
                        "Restriction expired, roles restored"
                    );
                }
                Revert::Gone => {
                    report.gone += 1;
                    tracing::info!(
                        guild = %mute.guild,
                        user = %mute.user,
                        "Restriction expired for a member who is gone, record removed"
                    );
                }
            }
        }

        report
    }

    async fn revert(&self, mute: &Restriction) -> Result<Revert, BotError> {
        let Some(guild) = self.platform.guild(mute.guild).await? else {
            return Ok(Revert::Gone);
        };
        let Some(member) = self.platform.member(guild.id, mute.user).await? else {
            return Ok(Revert::Gone);
        };

        let saved = self.store.role_ids_for(mute).await?;
        let mut roles = Vec::with_capacity(saved.len());
        for id in saved {
            match self.platform.role(guild.id, id).await? {
                Some(role) => roles.push(role.id),
                None => tracing::debug!(guild = %guild.id, role = %id, "Saved role no longer exists, skipping"),
            }
        }

        self.platform.modify_member_roles(guild.id, member.user.id, roles);
        Ok(Revert::Restored)
    }
}
