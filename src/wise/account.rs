use crate::wise::client::{ClientResult, Connector, Remote};
use crate::wise::error::Error;
use crate::wise::model::{
    find_balance_id, Amount, BalanceId, BalanceKind, BalanceMovement, Currency, ProfileId,
};
use log::debug;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use uuid::Uuid;

/// Raised when an account cannot be linked. The token may be rejected, the
/// profile may lack a balance or jar in the requested currency, or the
/// service may be unreachable; callers are not told which.
#[derive(Debug, thiserror::Error)]
#[error("invalid api token, or no balance or jar in the requested currency")]
pub struct InvalidCredentials;

/// What gets stored for an account. Remote ids are resolved again on load.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct AccountRecord {
    pub name: String,
    pub access_token: String,
    pub balance_currency: Currency,
    pub jar_currency: Currency,
}

pub struct Account {
    name: String,
    access_token: String,
    balance_currency: Currency,
    jar_currency: Currency,
    profile_id: ProfileId,
    balance_id: BalanceId,
    jar_id: BalanceId,
    remote: Box<dyn Remote>,
}

impl Account {
    /// Validates the token by resolving the profile, the standard balance and
    /// the jar. The resolved ids are kept for the lifetime of the account.
    pub async fn new(
        name: String,
        access_token: String,
        balance_currency: Currency,
        jar_currency: Currency,
        remote: Box<dyn Remote>,
    ) -> Result<Self, InvalidCredentials> {
        let resolved = resolve(remote.as_ref(), balance_currency, jar_currency).await;
        let (profile_id, balance_id, jar_id) = resolved.map_err(|e| {
            debug!("Rejecting account {}: {}", name, e);
            InvalidCredentials
        })?;
        Ok(Self {
            name,
            access_token,
            balance_currency,
            jar_currency,
            profile_id,
            balance_id,
            jar_id,
            remote,
        })
    }

    pub async fn open(
        connector: &dyn Connector,
        record: AccountRecord,
    ) -> Result<Self, InvalidCredentials> {
        let remote = connector.connect(&record.access_token).map_err(|e| {
            debug!("Rejecting account {}: {}", record.name, e);
            InvalidCredentials
        })?;
        Self::new(
            record.name,
            record.access_token,
            record.balance_currency,
            record.jar_currency,
            remote,
        )
        .await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn balance_currency(&self) -> Currency {
        self.balance_currency
    }

    pub fn jar_currency(&self) -> Currency {
        self.jar_currency
    }

    pub fn balance_id(&self) -> BalanceId {
        self.balance_id
    }

    pub fn jar_id(&self) -> BalanceId {
        self.jar_id
    }

    /// Live amount held by `balance_id`, never cached.
    pub async fn amount(&self, balance_id: BalanceId) -> ClientResult<Decimal> {
        self.remote
            .balances(self.profile_id, BalanceKind::Standard)
            .await?
            .into_iter()
            .find(|b| b.id == balance_id)
            .map(|b| b.amount.value)
            .ok_or(Error::NoSuchBalance(balance_id))
    }

    /// Moves `amount` from the standard balance into the jar under a fresh
    /// idempotence key.
    pub async fn transfer(&self, amount: Decimal, currency: Currency) -> ClientResult<StatusCode> {
        let movement = BalanceMovement {
            amount: Amount {
                value: amount,
                currency: currency.code().to_string(),
            },
            source_balance_id: self.balance_id,
            target_balance_id: self.jar_id,
        };
        self.remote
            .move_to_jar(self.profile_id, &movement, Uuid::new_v4())
            .await
    }

    pub fn record(&self) -> AccountRecord {
        AccountRecord {
            name: self.name.clone(),
            access_token: self.access_token.clone(),
            balance_currency: self.balance_currency,
            jar_currency: self.jar_currency,
        }
    }

    /// The token with everything but its tail hidden, for chats and logs.
    pub fn masked_token(&self) -> String {
        mask_token(&self.access_token)
    }
}

impl Debug for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("access_token", &self.masked_token())
            .field("balance_currency", &self.balance_currency)
            .field("jar_currency", &self.jar_currency)
            .finish()
    }
}

pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

async fn resolve(
    remote: &dyn Remote,
    balance_currency: Currency,
    jar_currency: Currency,
) -> ClientResult<(ProfileId, BalanceId, BalanceId)> {
    let profile = remote.profile_id().await?;
    let balances = remote.balances(profile, BalanceKind::Standard).await?;
    let balance_id = find_balance_id(&balances, balance_currency)
        .ok_or(Error::NoSuchCurrency(balance_currency))?;
    let jars = remote.balances(profile, BalanceKind::Savings).await?;
    let jar_id =
        find_balance_id(&jars, jar_currency).ok_or(Error::NoSuchCurrency(jar_currency))?;
    Ok((profile, balance_id, jar_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wise::fake::{FakeConnector, Ledger};

    #[tokio::test]
    async fn resolves_ids_on_construction() {
        let ledger = Ledger::new(Currency::EUR, Decimal::new(30, 0), Currency::EUR);
        let account = Account::new(
            "alice".into(),
            "token-a".into(),
            Currency::EUR,
            Currency::EUR,
            ledger.remote(),
        )
        .await
        .expect("account should link");
        assert_eq!(account.balance_id(), Ledger::BALANCE_ID);
        assert_eq!(account.jar_id(), Ledger::JAR_ID);
        assert_eq!(
            account.amount(account.balance_id()).await.unwrap(),
            Decimal::new(30, 0)
        );
    }

    #[tokio::test]
    async fn missing_jar_currency_is_invalid_credentials() {
        let ledger = Ledger::new(Currency::EUR, Decimal::ZERO, Currency::USD);
        let result = Account::new(
            "bob".into(),
            "token-b".into(),
            Currency::EUR,
            Currency::UAH,
            ledger.remote(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejected_token_is_invalid_credentials() {
        let ledger = Ledger::new(Currency::EUR, Decimal::ZERO, Currency::EUR);
        ledger.reject_profile();
        let result = Account::new(
            "carol".into(),
            "token-c".into(),
            Currency::EUR,
            Currency::EUR,
            ledger.remote(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn open_goes_through_connector() {
        let connector = FakeConnector::default();
        connector.insert("token-d", Ledger::new(Currency::UAH, Decimal::ZERO, Currency::UAH));
        let record = AccountRecord {
            name: "dave".into(),
            access_token: "token-d".into(),
            balance_currency: Currency::UAH,
            jar_currency: Currency::UAH,
        };
        let account = Account::open(&connector, record.clone()).await.unwrap();
        assert_eq!(account.record(), record);

        let unknown = AccountRecord {
            access_token: "token-unknown".into(),
            ..record
        };
        assert!(Account::open(&connector, unknown).await.is_err());
    }

    #[tokio::test]
    async fn transfers_carry_distinct_idempotence_keys() {
        let ledger = Ledger::new(Currency::USD, Decimal::new(5, 0), Currency::USD);
        let account = Account::new(
            "erin".into(),
            "token-e".into(),
            Currency::USD,
            Currency::USD,
            ledger.remote(),
        )
        .await
        .unwrap();
        account.transfer(Decimal::new(5, 0), Currency::USD).await.unwrap();
        account.transfer(Decimal::new(5, 0), Currency::USD).await.unwrap();

        let moves = ledger.movements();
        assert_eq!(moves.len(), 2);
        assert_ne!(moves[0].1, moves[1].1);
        assert_eq!(moves[0].0.source_balance_id, Ledger::BALANCE_ID);
        assert_eq!(moves[0].0.target_balance_id, Ledger::JAR_ID);
    }

    #[test]
    fn masks_all_but_tail() {
        assert_eq!(mask_token("abcdefgh"), "****efgh");
        assert_eq!(mask_token("abc"), "***");
    }
}
