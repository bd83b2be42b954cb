use redb::TableDefinition;
use std::sync::Arc;
use teloxide::dispatching::{HandlerExt, UpdateFilterExt};
use teloxide::prelude::{ChatId, Dispatcher, LoggingErrorHandler, ResponseResult, Update};
use teloxide::types::Message;
use teloxide::{dptree, Bot};
use tokio::sync::Mutex;

mod bot;
mod config;
mod registry;
mod repo;
mod route;
mod sweep;
mod wise;

use crate::bot::notify::ChatNotifier;
use crate::config::Config;
use crate::registry::Registry;
use crate::repo::redb::RedbRepo;
use crate::route::Router;
use crate::sweep::Scheduler;
use crate::wise::{AccountRecord, Connector, HttpConnector};
use bot::cmd::Command;
use log::{error, info, warn};

type DefaultManagement = bot::logic::Management<RedbRepo<AccountRecord>>;

const ACCOUNTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let repo: RedbRepo<AccountRecord> =
        RedbRepo::create(ACCOUNTS_TABLE, &config.db_path).expect("Failed to create database");
    let connector: Arc<dyn Connector> = Arc::new(HttpConnector::new(config.api_url.clone()));
    let registry = Arc::new(Registry::new());

    let accounts = repo::load_accounts(&repo, connector.as_ref())
        .await
        .expect("Failed to list stored accounts");
    info!("Loaded {} stored accounts", accounts.len());
    for account in accounts {
        if let Err(e) = registry.add(account).await {
            warn!("Skipping stored account: {}", e);
        }
    }

    let admin = ChatId(config.admin_chat);
    let bot = Arc::new(Bot::from_env());
    let router = Router::new(
        registry.clone(),
        Arc::new(ChatNotifier::new(bot.to_owned(), admin)),
    );
    let scheduler = Scheduler::new(registry.clone(), config.interval, config.pool_size);
    tokio::spawn(async move { scheduler.start(&router).await });

    let logic = bot::logic::Management::new(registry, repo, connector, admin);
    let handler = Update::filter_message().chain(
        dptree::entry()
            .filter_command::<Command>()
            .endpoint(default_command_handler),
    );

    Dispatcher::builder(bot.to_owned(), handler)
        .dependencies(dptree::deps![Arc::new(Mutex::new(logic))])
        .error_handler(LoggingErrorHandler::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn default_command_handler(
    bot: Arc<Bot>,
    msg: Message,
    cmd: Command,
    logic: Arc<Mutex<DefaultManagement>>,
) -> ResponseResult<()> {
    logic.lock().await.handle(bot.as_ref(), msg, cmd).await
}
