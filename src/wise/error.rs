use crate::wise::model::{BalanceId, Currency};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote answered {0}")]
    Status(reqwest::StatusCode),
    #[error("token cannot be used as a header value")]
    MalformedToken,
    #[error("no profile attached to this token")]
    NoProfile,
    #[error("no balance in {0}")]
    NoSuchCurrency(Currency),
    #[error("no balance with id {0}")]
    NoSuchBalance(BalanceId),
}
