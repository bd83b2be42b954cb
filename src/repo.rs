pub mod model;
pub mod redb;

use crate::wise::{Account, AccountRecord, Connector};
use log::warn;
use model::Repository;

/// Rebuilds every stored account. Records that no longer validate are
/// skipped but stay in storage.
pub async fn load_accounts<R>(repo: &R, connector: &dyn Connector) -> Result<Vec<Account>, R::Err>
where
    R: Repository<AccountRecord>,
{
    let mut accounts = Vec::new();
    for (_, record) in repo.entries()? {
        let name = record.name.clone();
        match Account::open(connector, record).await {
            Ok(account) => accounts.push(account),
            Err(e) => warn!("Not loading stored account {}: {}", name, e),
        }
    }
    Ok(accounts)
}

pub fn persist_account<R>(repo: &mut R, account: &Account) -> Result<(), R::Err>
where
    R: Repository<AccountRecord>,
{
    repo.put(account.access_token(), account.record())
}
