use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type ProfileId = u64;
pub type BalanceId = u64;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Currency {
    USD,
    EUR,
    UAH,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::UAH => "UAH",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported currency {0}, expected one of USD, EUR, UAH")]
pub struct UnknownCurrency(String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "UAH" => Ok(Currency::UAH),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

/// Which family of balances to list under a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceKind {
    Standard,
    /// Jars.
    Savings,
}

impl BalanceKind {
    pub fn query_value(&self) -> &'static str {
        match self {
            BalanceKind::Standard => "STANDARD",
            BalanceKind::Savings => "SAVINGS",
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Profile {
    pub id: ProfileId,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Amount {
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub currency: String,
}

/// Only `value` is relied upon for listed balances.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct BalanceAmount {
    pub value: Decimal,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Balance {
    pub id: BalanceId,
    pub currency: String,
    pub amount: BalanceAmount,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceMovement {
    pub amount: Amount,
    pub source_balance_id: BalanceId,
    pub target_balance_id: BalanceId,
}

/// Linear scan for the first balance denominated in `currency`.
pub fn find_balance_id(balances: &[Balance], currency: Currency) -> Option<BalanceId> {
    balances
        .iter()
        .find(|b| b.currency == currency.code())
        .map(|b| b.id)
}
