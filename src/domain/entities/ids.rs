//! Platform identifiers
//!
//! Every remote entity is addressed by a 64-bit snowflake. Each kind gets its
//! own newtype so a role id can never be passed where a user id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// A guild (community) on the platform
    GuildId
);
snowflake!(
    /// A user account, independent of any guild
    UserId
);
snowflake!(RoleId);
snowflake!(ChannelId);
snowflake!(MessageId);

/// The emoji a reaction was made with.
///
/// Unicode emoji are kept verbatim, custom emoji as `name:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionKey(String);

impl ReactionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for a custom guild emoji
    pub fn custom(name: &str, id: u64) -> Self {
        Self(format!("{}:{}", name, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
