use crate::wise::error::Error;
use crate::wise::model::{Balance, BalanceKind, BalanceMovement, Profile, ProfileId};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use std::time::Duration;
use uuid::Uuid;

pub const WISE_API: &str = "https://api.transferwise.com";
const IDEMPOTENCE_HEADER: &str = "X-idempotence-uuid";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const BALANCES_TIMEOUT: Duration = Duration::from_secs(1);
/// Longer than reads; a timed out transfer may still have been executed.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(2);

pub type ClientResult<T> = Result<T, Error>;

/// The balance-holding service as seen by a single account.
#[async_trait]
pub trait Remote: Send + Sync {
    async fn profile_id(&self) -> ClientResult<ProfileId>;

    async fn balances(&self, profile: ProfileId, kind: BalanceKind) -> ClientResult<Vec<Balance>>;

    /// Posts a balance-to-jar movement. Any answer from the service is `Ok`,
    /// the status code carries the verdict.
    async fn move_to_jar(
        &self,
        profile: ProfileId,
        movement: &BalanceMovement,
        idempotence_key: Uuid,
    ) -> ClientResult<StatusCode>;
}

/// Builds a [`Remote`] bound to one access token.
pub trait Connector: Send + Sync {
    fn connect(&self, access_token: &str) -> ClientResult<Box<dyn Remote>>;
}

pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn with_token(base_url: &str, token: &str) -> ClientResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| Error::MalformedToken)?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl Remote for Client {
    async fn profile_id(&self) -> ClientResult<ProfileId> {
        let res = self.client.get(self.url("v2/profiles")).send().await?;
        if !res.status().is_success() {
            return Err(Error::Status(res.status()));
        }
        res.json::<Vec<Profile>>()
            .await?
            .first()
            .map(|p| p.id)
            .ok_or(Error::NoProfile)
    }

    async fn balances(&self, profile: ProfileId, kind: BalanceKind) -> ClientResult<Vec<Balance>> {
        let url = self.url(&format!(
            "v4/profiles/{}/balances?types={}",
            profile,
            kind.query_value()
        ));
        let res = self
            .client
            .get(url)
            .timeout(BALANCES_TIMEOUT)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(Error::Status(res.status()));
        }
        Ok(res.json::<Vec<Balance>>().await?)
    }

    async fn move_to_jar(
        &self,
        profile: ProfileId,
        movement: &BalanceMovement,
        idempotence_key: Uuid,
    ) -> ClientResult<StatusCode> {
        let url = self.url(&format!("v2/profiles/{}/balance-movements", profile));
        let res = self
            .client
            .post(url)
            .header(IDEMPOTENCE_HEADER, idempotence_key.to_string())
            .json(movement)
            .timeout(TRANSFER_TIMEOUT)
            .send()
            .await?;
        Ok(res.status())
    }
}

/// Opens [`Client`]s against a fixed base URL.
pub struct HttpConnector {
    base_url: String,
}

impl HttpConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Connector for HttpConnector {
    fn connect(&self, access_token: &str) -> ClientResult<Box<dyn Remote>> {
        Ok(Box::new(Client::with_token(&self.base_url, access_token)?))
    }
}
