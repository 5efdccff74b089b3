use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

use crate::ebs_client::EbsTarget;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LIVE_URL: &str = "https://172.16.199.1:8181/QAConsumer/";
pub const DEFAULT_MOCK_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_MOCK_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://noebs.db?mode=rwc";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_host: String,
    pub port: u16,
    pub ebs_target: EbsTarget,
    pub mock_addr: SocketAddr,
    pub database_url: String,
    pub ebs_timeout: Duration,
    pub ebs_api_key: Option<String>,
    pub accept_invalid_certs: bool,
    pub json_logs: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let ebs_target = match get("EBS_LOCAL_DEV") {
            Some(_) => EbsTarget::Mock(get("EBS_MOCK_URL").unwrap_or_else(|| DEFAULT_MOCK_URL.into())),
            None => EbsTarget::Live(
                get("EBS_MERCHANT_URL").unwrap_or_else(|| DEFAULT_LIVE_URL.into()),
            ),
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .trim_start_matches(':')
                .parse::<u16>()
                .map_err(|err| invalid("PORT", &raw, err))?,
            None => DEFAULT_PORT,
        };

        let mock_addr = get("EBS_MOCK_ADDR").unwrap_or_else(|| DEFAULT_MOCK_ADDR.into());
        let mock_addr = mock_addr
            .parse::<SocketAddr>()
            .map_err(|err| invalid("EBS_MOCK_ADDR", &mock_addr, err))?;

        let ebs_timeout = match get("EBS_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => return Err(invalid("EBS_TIMEOUT_SECS", &raw, "must be positive")),
                Ok(secs) => Duration::from_secs(secs),
                Err(err) => return Err(invalid("EBS_TIMEOUT_SECS", &raw, err)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let accept_invalid_certs = match get("EBS_ACCEPT_INVALID_CERTS") {
            Some(raw) => parse_flag("EBS_ACCEPT_INVALID_CERTS", &raw)?,
            None => false,
        };

        Ok(Self {
            listen_host: get("LISTEN_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            ebs_target,
            mock_addr,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            ebs_timeout,
            ebs_api_key: get("EBS_API_KEY"),
            accept_invalid_certs,
            json_logs: get("LOG_FORMAT").is_some_and(|format| format.eq_ignore_ascii_case("json")),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.port)
    }
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw, "expected a boolean")),
    }
}
