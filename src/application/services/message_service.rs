use std::sync::{Arc, PoisonError, RwLock};
use async_trait::async_trait;
use crate::application::errors::BotError;
use crate::application::listeners::{ButtonListeners, Listener};
use crate::domain::entities::{ButtonClick, Event, Message};
use crate::domain::traits::{Platform, Store};
use super::{CommandService, Leveling};

/// Routes chat messages to commands and awards points; forwards button
/// clicks to their callbacks.
pub struct MessageService {
    store: Arc<dyn Store>,
    platform: Arc<dyn Platform>,
    commands: Arc<RwLock<CommandService>>,
    leveling: Leveling,
    buttons: Arc<ButtonListeners>,
}

impl MessageService {
    pub fn new(
        store: Arc<dyn Store>,
        platform: Arc<dyn Platform>,
        commands: Arc<RwLock<CommandService>>,
        leveling: Leveling,
        buttons: Arc<ButtonListeners>,
    ) -> Self {
        Self {
            store,
            platform,
            commands,
            leveling,
            buttons,
        }
    }

    /// Process an incoming message. Returns whether it was handled at all.
    pub async fn process(&self, message: &Message) -> Result<bool, BotError> {
        if self.store.banned(message.author.id).await? {
            return Ok(false);
        }
        if message.author.id == self.platform.self_user().id {
            return Ok(false);
        }

        let reply = {
            let commands = self.commands.read().unwrap_or_else(PoisonError::into_inner);
            match commands.handle(message) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::debug!(channel = %message.channel, "Command failed: {}", e);
                    Some(commands.error_reply(&e))
                }
            }
        };
        if let Some(text) = reply {
            self.platform.send_message(message.channel, &text);
        }

        // Point accrual must never hold up command handling
        self.leveling.award(message);
        Ok(true)
    }

    pub async fn click(&self, click: &ButtonClick) -> Result<(), BotError> {
        if self.store.banned(click.user).await? {
            return Ok(());
        }
        self.buttons.notify(click);
        Ok(())
    }
}

#[async_trait]
impl Listener for MessageService {
    fn name(&self) -> &str {
        "messages"
    }

    async fn on_event(&self, event: &Event) -> Result<(), BotError> {
        match event {
            Event::MessageReceived(message) => {
                self.process(message).await?;
            }
            Event::ButtonClicked(click) => self.click(click).await?,
            _ => {}
        }
        Ok(())
    }
}
