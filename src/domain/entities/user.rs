use std::fmt;
use super::UserId;

/// Represents a platform user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: UserId,
    pub username: Option<String>,
    pub discriminator: Option<String>,
    pub is_bot: bool,
}

impl User {
    pub fn new(id: u64) -> Self {
        Self {
            id: UserId(id),
            username: None,
            discriminator: None,
            is_bot: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// `name#1234` when both parts are known, otherwise the best available name
    pub fn tag(&self) -> String {
        match (&self.username, &self.discriminator) {
            (Some(name), Some(disc)) => format!("{}#{}", name, disc),
            (Some(name), None) => name.clone(),
            _ => self.id.to_string(),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
