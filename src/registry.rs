use crate::wise::account::mask_token;
use crate::wise::Account;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("no matching account for token {0}")]
    NotFound(String),
    #[error("token {0} is already registered")]
    Duplicate(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Default)]
struct Partitions {
    enabled: Vec<Arc<Account>>,
    disabled: Vec<Arc<Account>>,
}

fn position(accounts: &[Arc<Account>], token: &str) -> Option<usize> {
    accounts.iter().position(|a| a.access_token() == token)
}

/// Point-in-time copy of both partitions.
pub struct Listing {
    pub enabled: Vec<Arc<Account>>,
    pub disabled: Vec<Arc<Account>>,
}

/// Owns every known account and which side of the enabled/disabled split it
/// is on. Each account sits in exactly one partition until deleted.
#[derive(Default)]
pub struct Registry {
    partitions: Mutex<Partitions>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// New accounts start disabled.
    pub async fn add(&self, account: Account) -> Result<Arc<Account>> {
        let mut p = self.partitions.lock().await;
        let token = account.access_token();
        if position(&p.enabled, token).is_some() || position(&p.disabled, token).is_some() {
            return Err(Error::Duplicate(mask_token(token)));
        }
        let account = Arc::new(account);
        p.disabled.push(account.clone());
        Ok(account)
    }

    pub async fn enable(&self, token: &str) -> Result<()> {
        let mut p = self.partitions.lock().await;
        let idx = position(&p.disabled, token).ok_or_else(|| Error::NotFound(mask_token(token)))?;
        let account = p.disabled.remove(idx);
        p.enabled.push(account);
        Ok(())
    }

    pub async fn disable(&self, token: &str) -> Result<()> {
        let mut p = self.partitions.lock().await;
        let idx = position(&p.enabled, token).ok_or_else(|| Error::NotFound(mask_token(token)))?;
        let account = p.enabled.remove(idx);
        p.disabled.push(account);
        Ok(())
    }

    pub async fn delete(&self, token: &str) -> Result<Arc<Account>> {
        let mut p = self.partitions.lock().await;
        if let Some(idx) = position(&p.enabled, token) {
            return Ok(p.enabled.remove(idx));
        }
        match position(&p.disabled, token) {
            Some(idx) => Ok(p.disabled.remove(idx)),
            None => Err(Error::NotFound(mask_token(token))),
        }
    }

    /// Enabled accounts in registration order, as handed to a sweep cycle.
    pub async fn enabled(&self) -> Vec<Arc<Account>> {
        self.partitions.lock().await.enabled.clone()
    }

    pub async fn listing(&self) -> Listing {
        let p = self.partitions.lock().await;
        Listing {
            enabled: p.enabled.clone(),
            disabled: p.disabled.clone(),
        }
    }
}
