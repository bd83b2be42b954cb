use crate::registry::Registry;
use crate::route::Router;
use crate::wise::Account;
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// What the service answers to an accepted transfer; also reported when
/// nothing had to be moved.
pub const SUCCESS: StatusCode = StatusCode::CREATED;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub name: String,
    pub access_token: String,
    pub status: StatusCode,
}

impl Outcome {
    fn new(account: &Account, status: StatusCode) -> Self {
        Self {
            name: account.name().to_string(),
            access_token: account.access_token().to_string(),
            status,
        }
    }

    fn skipped(account: &Account) -> Self {
        Self::new(account, SUCCESS)
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }
}

/// Moves the whole standard balance into the jar. Failing to read the
/// balance, or a transfer that never got an answer, is reported as success;
/// any answer from the service is reported as is.
pub async fn sweep_account(account: &Account) -> Outcome {
    let amount = match account.amount(account.balance_id()).await {
        Ok(amount) => amount,
        Err(e) => {
            debug!("Skipping {}, balance unavailable: {}", account.name(), e);
            return Outcome::skipped(account);
        }
    };
    if amount <= Decimal::ZERO {
        return Outcome::skipped(account);
    }

    match account.transfer(amount, account.balance_currency()).await {
        Ok(status) => {
            info!(
                "Transfer of {} {} to jar {} of {} answered {}",
                amount,
                account.balance_currency(),
                account.jar_id(),
                account.name(),
                status
            );
            Outcome::new(account, status)
        }
        Err(e) => {
            warn!("Transfer for {} got no answer: {}", account.name(), e);
            Outcome::skipped(account)
        }
    }
}

/// At most `limit` sweeps in flight; results come back in submission order.
async fn run_pool(accounts: Vec<Arc<Account>>, limit: usize) -> Vec<Outcome> {
    stream::iter(accounts)
        .map(|account| async move { sweep_account(&account).await })
        .buffered(limit.max(1))
        .collect()
        .await
}

/// One pass over `accounts`. The first half is swept on a separate task so
/// a failure there cannot take down the caller; the second half is swept in
/// place at the same time. First-half outcomes precede second-half ones, and
/// every account yields exactly one outcome.
pub async fn run_cycle(accounts: Vec<Arc<Account>>, pool_size: usize) -> Vec<Outcome> {
    let mut first = accounts;
    let second = first.split_off(first.len() / 2);
    let fallback: Vec<Outcome> = first.iter().map(|a| Outcome::skipped(a)).collect();

    let isolated = tokio::spawn(run_pool(first, pool_size));
    let local = run_pool(second, pool_size).await;

    let mut outcomes = match isolated.await {
        Ok(outcomes) => outcomes,
        Err(e) => {
            error!(
                "Isolated half of the sweep failed, discarding statuses of its {} accounts: {}",
                fallback.len(),
                e
            );
            fallback
        }
    };
    outcomes.extend(local);
    outcomes
}

pub struct Scheduler {
    registry: Arc<Registry>,
    interval: Duration,
    pool_size: usize,
}

impl Scheduler {
    pub fn new(registry: Arc<Registry>, interval: Duration, pool_size: usize) -> Self {
        Self {
            registry,
            interval,
            pool_size,
        }
    }

    pub async fn cycle(&self) -> Vec<Outcome> {
        let enabled = self.registry.enabled().await;
        debug!("Sweeping {} enabled accounts", enabled.len());
        run_cycle(enabled, self.pool_size).await
    }

    /// Runs forever. A tick that fires while a cycle is still running is
    /// dropped, so cycles never overlap.
    pub async fn start(&self, router: &Router) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let outcomes = self.cycle().await;
            router.route(&outcomes).await;
        }
    }
}
