use crate::bot::cmd::Command;
use crate::registry::{self, Registry};
use crate::repo::model::Repository;
use crate::repo::persist_account;
use crate::wise::account::mask_token;
use crate::wise::model::Currency;
use crate::wise::{Account, AccountRecord, Connector};
use log::{error, info};
use std::fmt::{Display, Write};
use std::sync::Arc;
use teloxide::prelude::{ChatId, Message, Requester, ResponseResult};
use teloxide::utils::command::BotCommands;
use teloxide::Bot;

/// Account management behind the admin chat. Every operation answers with
/// the text to send back.
pub struct Management<R>
where
    R: Repository<AccountRecord>,
{
    registry: Arc<Registry>,
    repo: R,
    connector: Arc<dyn Connector>,
    admin: ChatId,
}

impl<R> Management<R>
where
    R: Repository<AccountRecord>,
    <R as Repository<AccountRecord>>::Err: Display,
{
    pub fn new(
        registry: Arc<Registry>,
        repo: R,
        connector: Arc<dyn Connector>,
        admin: ChatId,
    ) -> Self {
        Self {
            registry,
            repo,
            connector,
            admin,
        }
    }

    pub async fn handle(&mut self, bot: &Bot, msg: Message, cmd: Command) -> ResponseResult<()> {
        if msg.chat.id != self.admin {
            bot.send_message(msg.chat.id, "This chat is not allowed to manage accounts.")
                .await?;
            return Ok(());
        }
        let reply = match cmd {
            Command::Help => Command::descriptions().to_string(),
            Command::List => self.list().await,
            Command::Add {
                name,
                token,
                balance,
                jar,
            } => {
                // Keep the token out of the chat history.
                if let Err(e) = bot.delete_message(msg.chat.id, msg.id).await {
                    error!("Could not remove /add message: {}", e);
                }
                self.add(name, token, balance, jar).await
            }
            Command::Enable { token } => self.enable(&token).await,
            Command::Disable { token } => self.disable(&token).await,
            Command::Delete { token } => self.delete(&token).await,
        };
        bot.send_message(msg.chat.id, reply).await?;
        Ok(())
    }

    pub async fn list(&self) -> String {
        let listing = self.registry.listing().await;
        let mut out = String::new();
        for (title, accounts) in [("Enabled", &listing.enabled), ("Disabled", &listing.disabled)] {
            let _ = writeln!(out, "{} ({}):", title, accounts.len());
            for account in accounts.iter() {
                let _ = writeln!(
                    out,
                    "  {} [{}] {} -> {} jar",
                    account.name(),
                    account.masked_token(),
                    account.balance_currency(),
                    account.jar_currency()
                );
            }
        }
        out
    }

    pub async fn add(
        &mut self,
        name: String,
        token: String,
        balance: Currency,
        jar: Currency,
    ) -> String {
        let record = AccountRecord {
            name,
            access_token: token,
            balance_currency: balance,
            jar_currency: jar,
        };
        let account = match Account::open(self.connector.as_ref(), record).await {
            Ok(account) => account,
            Err(e) => return format!("{}.", capitalize(&e.to_string())),
        };
        let account = match self.registry.add(account).await {
            Ok(account) => account,
            Err(e) => return format!("Not added: {}.", e),
        };
        // A record that failed to load at startup is still on disk.
        match self.repo.get(account.access_token()) {
            Ok(Some(previous)) => info!(
                "Replacing stored record {} with account {}",
                previous.name,
                account.name()
            ),
            Ok(None) => {}
            Err(e) => error!("Error while reading stored account {}: {}", account.name(), e),
        }
        let stored = persist_account(&mut self.repo, &account)
            .map_err(|e| error!("Error while storing account {}: {}", account.name(), e))
            .is_ok();
        if !stored {
            let _ = self.registry.delete(account.access_token()).await;
            return "Failed to update database. The account was not added.".to_string();
        }
        info!("Added account {}", account.name());
        format!(
            "Added {} [{}]. Use /enable to start sweeping.",
            account.name(),
            account.masked_token()
        )
    }

    pub async fn enable(&self, token: &str) -> String {
        transition_reply(self.registry.enable(token).await, token, "enabled")
    }

    pub async fn disable(&self, token: &str) -> String {
        transition_reply(self.registry.disable(token).await, token, "disabled")
    }

    pub async fn delete(&mut self, token: &str) -> String {
        let account = match self.registry.delete(token).await {
            Ok(account) => account,
            Err(e) => return format!("{}.", capitalize(&e.to_string())),
        };
        if let Err(e) = self.repo.revoke(token) {
            error!(
                "Error while removing stored account {}: {}",
                account.name(),
                e
            );
            return format!(
                "Deleted {}, but it could not be removed from the database.",
                account.name()
            );
        }
        info!("Deleted account {}", account.name());
        format!("Deleted {}.", account.name())
    }
}

fn transition_reply(result: registry::Result<()>, token: &str, state: &str) -> String {
    match result {
        Ok(()) => {
            info!("Account [{}] {}", mask_token(token), state);
            format!("Account [{}] {}.", mask_token(token), state)
        }
        Err(e) => format!("{}.", capitalize(&e.to_string())),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
