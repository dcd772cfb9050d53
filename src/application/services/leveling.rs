use std::sync::Arc;
use tokio::task::JoinHandle;
use crate::application::errors::error_chain;
use crate::domain::entities::Message;
use crate::domain::traits::Store;

/// Awards participation points for chatting
pub struct Leveling {
    store: Arc<dyn Store>,
    points_per_message: f64,
}

impl Leveling {
    pub fn new(store: Arc<dyn Store>, points_per_message: f64) -> Self {
        Self {
            store,
            points_per_message,
        }
    }

    pub fn points_per_message(&self) -> f64 {
        self.points_per_message
    }

    /// Credit the author of `message` on a background task
    pub fn award(&self, message: &Message) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let points = self.points_per_message;
        let (guild, user) = (message.guild, message.author.id);

        tokio::spawn(async move {
            match store.add_points(guild, user, points).await {
                Ok(total) => tracing::trace!(guild = %guild, user = %user, total, "Points awarded"),
                Err(e) => tracing::warn!(guild = %guild, user = %user, "Failed to award points: {}", error_chain(&e)),
            }
        })
    }
}
