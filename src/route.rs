use crate::registry::Registry;
use crate::sweep::Outcome;
use async_trait::async_trait;
use log::{error, warn};
use reqwest::StatusCode;
use std::error::Error;
use std::sync::Arc;

pub type NotifyResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Delivers failure alerts to whoever operates the accounts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> NotifyResult;
}

#[derive(Debug, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Unauthorized,
    ServiceError(StatusCode),
}

impl From<&Outcome> for Verdict {
    fn from(outcome: &Outcome) -> Self {
        if outcome.is_success() {
            Verdict::Ok
        } else if outcome.status == StatusCode::UNAUTHORIZED {
            Verdict::Unauthorized
        } else {
            Verdict::ServiceError(outcome.status)
        }
    }
}

fn alert(verdict: &Verdict, name: &str) -> Option<(String, String)> {
    match verdict {
        Verdict::Ok => None,
        Verdict::Unauthorized => Some((
            "Authentication error".to_string(),
            format!(
                "Authentication error with such account: {}\nPlease review your account credentials!",
                name
            ),
        )),
        Verdict::ServiceError(status) => Some((
            "Wise account error".to_string(),
            format!(
                "Wise returned {} status code for such account: {}\nPlease review your account credentials or check wise account settings",
                status.as_u16(),
                name
            ),
        )),
    }
}

/// Turns failed outcomes into an alert plus a disable transition.
pub struct Router {
    registry: Arc<Registry>,
    notifier: Arc<dyn Notifier>,
}

impl Router {
    pub fn new(registry: Arc<Registry>, notifier: Arc<dyn Notifier>) -> Self {
        Self { registry, notifier }
    }

    pub async fn route(&self, outcomes: &[Outcome]) {
        for outcome in outcomes {
            let verdict = Verdict::from(outcome);
            let Some((subject, body)) = alert(&verdict, &outcome.name) else {
                continue;
            };
            warn!("Disabling {} after {:?}", outcome.name, verdict);
            if let Err(e) = self.notifier.notify(&subject, &body).await {
                error!("Failed to deliver alert for {}: {}", outcome.name, e);
            }
            if let Err(e) = self.registry.disable(&outcome.access_token).await {
                error!("Failed to disable {}: {}", outcome.name, e);
            }
        }
    }
}
