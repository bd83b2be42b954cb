//! In-process stand-ins for the balance service used across unit tests.

use crate::wise::client::{ClientResult, Connector, Remote};
use crate::wise::error::Error;
use crate::wise::model::{
    Balance, BalanceAmount, BalanceKind, BalanceMovement, Currency, ProfileId,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Tracks how many balance reads are in flight at once.
#[derive(Default)]
pub struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

struct State {
    profile: Option<ProfileId>,
    standard: Vec<Balance>,
    savings: Vec<Balance>,
    balances_fail: bool,
    transfer_status: StatusCode,
    transfer_fails: bool,
    movements: Vec<(BalanceMovement, Uuid)>,
    gauge: Option<Arc<Gauge>>,
    panic_on_read: bool,
}

/// One remote profile with a single standard balance and a single jar.
#[derive(Clone)]
pub struct Ledger {
    state: Arc<Mutex<State>>,
}

impl Ledger {
    pub const PROFILE_ID: ProfileId = 7;
    pub const BALANCE_ID: u64 = 100;
    pub const JAR_ID: u64 = 200;

    pub fn new(balance_currency: Currency, amount: Decimal, jar_currency: Currency) -> Self {
        let state = State {
            profile: Some(Self::PROFILE_ID),
            standard: vec![Balance {
                id: Self::BALANCE_ID,
                currency: balance_currency.code().to_string(),
                amount: BalanceAmount { value: amount },
            }],
            savings: vec![Balance {
                id: Self::JAR_ID,
                currency: jar_currency.code().to_string(),
                amount: BalanceAmount {
                    value: Decimal::ZERO,
                },
            }],
            balances_fail: false,
            transfer_status: StatusCode::CREATED,
            transfer_fails: false,
            movements: Vec::new(),
            gauge: None,
            panic_on_read: false,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn remote(&self) -> Box<dyn Remote> {
        Box::new(FakeRemote {
            ledger: self.clone(),
        })
    }

    pub fn reject_profile(&self) {
        self.state.lock().unwrap().profile = None;
    }

    pub fn fail_balances(&self) {
        self.state.lock().unwrap().balances_fail = true;
    }

    pub fn answer_transfers_with(&self, status: StatusCode) {
        self.state.lock().unwrap().transfer_status = status;
    }

    pub fn fail_transfers(&self) {
        self.state.lock().unwrap().transfer_fails = true;
    }

    pub fn panic_on_read(&self) {
        self.state.lock().unwrap().panic_on_read = true;
    }

    pub fn watch(&self, gauge: Arc<Gauge>) {
        self.state.lock().unwrap().gauge = Some(gauge);
    }

    pub fn movements(&self) -> Vec<(BalanceMovement, Uuid)> {
        self.state.lock().unwrap().movements.clone()
    }
}

struct FakeRemote {
    ledger: Ledger,
}

#[async_trait]
impl Remote for FakeRemote {
    async fn profile_id(&self) -> ClientResult<ProfileId> {
        self.ledger
            .state
            .lock()
            .unwrap()
            .profile
            .ok_or(Error::Status(StatusCode::UNAUTHORIZED))
    }

    async fn balances(&self, profile: ProfileId, kind: BalanceKind) -> ClientResult<Vec<Balance>> {
        let (explode, gauge) = {
            let state = self.ledger.state.lock().unwrap();
            (state.panic_on_read, state.gauge.clone())
        };
        if explode {
            panic!("balance read blew up");
        }
        if let Some(gauge) = &gauge {
            gauge.enter();
            tokio::time::sleep(Duration::from_millis(20)).await;
            gauge.leave();
        }

        let state = self.ledger.state.lock().unwrap();
        if state.profile != Some(profile) {
            return Err(Error::NoProfile);
        }
        if state.balances_fail {
            return Err(Error::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(match kind {
            BalanceKind::Standard => state.standard.clone(),
            BalanceKind::Savings => state.savings.clone(),
        })
    }

    async fn move_to_jar(
        &self,
        _profile: ProfileId,
        movement: &BalanceMovement,
        idempotence_key: Uuid,
    ) -> ClientResult<StatusCode> {
        let mut state = self.ledger.state.lock().unwrap();
        state.movements.push((movement.clone(), idempotence_key));
        if state.transfer_fails {
            return Err(Error::NoProfile);
        }
        Ok(state.transfer_status)
    }
}

/// Hands out remotes for known tokens and refuses everything else.
#[derive(Default)]
pub struct FakeConnector {
    ledgers: Mutex<HashMap<String, Ledger>>,
}

impl FakeConnector {
    pub fn insert(&self, token: &str, ledger: Ledger) {
        self.ledgers
            .lock()
            .unwrap()
            .insert(token.to_string(), ledger);
    }
}

impl Connector for FakeConnector {
    fn connect(&self, access_token: &str) -> ClientResult<Box<dyn Remote>> {
        self.ledgers
            .lock()
            .unwrap()
            .get(access_token)
            .map(|l| l.remote())
            .ok_or(Error::MalformedToken)
    }
}
