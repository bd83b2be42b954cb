use crate::wise::client::WISE_API;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const ADMIN_CHAT: &str = "JARSWEEP_ADMIN_CHAT";
const DB: &str = "JARSWEEP_DB";
const INTERVAL: &str = "JARSWEEP_INTERVAL_SECS";
const API_URL: &str = "JARSWEEP_API_URL";
const POOL_SIZE: &str = "JARSWEEP_POOL_SIZE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("environment variable {0} is missing")]
    Missing(&'static str),
    #[error("environment variable {0} has invalid value {1:?}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Receives alerts; the only chat allowed to manage accounts.
    pub admin_chat: i64,
    pub db_path: PathBuf,
    pub interval: Duration,
    pub api_url: String,
    /// Concurrency of each half of a sweep cycle.
    pub pool_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let admin_chat = parse(&lookup, ADMIN_CHAT)?.ok_or(Error::Missing(ADMIN_CHAT))?;
        let interval: u64 = parse(&lookup, INTERVAL)?.unwrap_or(10);
        let pool_size: usize = parse(&lookup, POOL_SIZE)?.unwrap_or(15);
        if interval == 0 {
            return Err(Error::Invalid(INTERVAL, "0".into()));
        }
        if pool_size == 0 {
            return Err(Error::Invalid(POOL_SIZE, "0".into()));
        }
        Ok(Self {
            admin_chat,
            db_path: lookup(DB).map_or_else(|| PathBuf::from("jarsweep.redb"), PathBuf::from),
            interval: Duration::from_secs(interval),
            api_url: lookup(API_URL).unwrap_or_else(|| WISE_API.to_string()),
            pool_size,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, Error> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Invalid(key, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[(ADMIN_CHAT, "-1001")]).unwrap();
        assert_eq!(config.admin_chat, -1001);
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.pool_size, 15);
        assert_eq!(config.api_url, WISE_API);
        assert_eq!(config.db_path, PathBuf::from("jarsweep.redb"));
    }

    #[test]
    fn admin_chat_is_required() {
        assert_eq!(load(&[]), Err(Error::Missing(ADMIN_CHAT)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            load(&[(ADMIN_CHAT, "1"), (INTERVAL, "soon")]),
            Err(Error::Invalid(INTERVAL, _))
        ));
        assert!(matches!(
            load(&[(ADMIN_CHAT, "1"), (POOL_SIZE, "0")]),
            Err(Error::Invalid(POOL_SIZE, _))
        ));
    }
}
