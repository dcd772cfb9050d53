use super::{GuildId, UserId};
use chrono::{DateTime, Duration, Utc};

/// A temporary mute: the member's roles were taken away at `start` and are
/// handed back once `end` has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub id: i64,
    pub guild: GuildId,
    pub user: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Restriction {
    /// Still in force at `now`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.end > now
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.end - now).max(Duration::zero())
    }
}

/// Formats a duration as `1h 5m 3s`, dropping zero units.
pub fn human_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}
