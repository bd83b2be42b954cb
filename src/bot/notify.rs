use crate::route::{Notifier, NotifyResult};
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::{ChatId, Requester};
use teloxide::Bot;

/// Posts alerts into the admin chat.
pub struct ChatNotifier {
    bot: Arc<Bot>,
    chat: ChatId,
}

impl ChatNotifier {
    pub fn new(bot: Arc<Bot>, chat: ChatId) -> Self {
        Self { bot, chat }
    }
}

#[async_trait]
impl Notifier for ChatNotifier {
    async fn notify(&self, subject: &str, body: &str) -> NotifyResult {
        self.bot
            .send_message(self.chat, format!("{}\n\n{}", subject, body))
            .await?;
        Ok(())
    }
}
