use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::consts::DEFAULT_LISTEN_ADDR;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} env var is required")]
    Missing(&'static str),
    #[error("{var} has an invalid value: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Deployment environment.  Only controls whether the API docs are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Staging,
    Production,
}

impl Environment {
    pub fn shows_docs(self) -> bool {
        matches!(self, Environment::Local | Environment::Staging)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

/// Immutable service configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    pub livekit_url: String,
    pub livekit_api_key: String,
    pub livekit_api_secret: String,
    pub sip_trunk_id: String,
    pub krisp_enabled: bool,
    pub environment: Environment,
    pub listen_addr: SocketAddr,
    pub wait_until_answered: bool,
}

// Hand-written so the API secret never ends up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("livekit_url", &self.livekit_url)
            .field("livekit_api_key", &self.livekit_api_key)
            .field("livekit_api_secret", &"<redacted>")
            .field("sip_trunk_id", &self.sip_trunk_id)
            .field("krisp_enabled", &self.krisp_enabled)
            .field("environment", &self.environment)
            .field("listen_addr", &self.listen_addr)
            .field("wait_until_answered", &self.wait_until_answered)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let optional = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty());

        let livekit_url = required("LIVEKIT_URL")?;
        let livekit_api_key = required("LIVEKIT_API_KEY")?;
        let livekit_api_secret = required("LIVEKIT_API_SECRET")?;
        let sip_trunk_id = required("SIP_TRUNK_ID")?;

        let krisp_enabled = match optional("KRISP_ENABLED") {
            Some(value) => parse_bool("KRISP_ENABLED", value)?,
            None => true,
        };
        let wait_until_answered = match optional("SIP_WAIT_UNTIL_ANSWERED") {
            Some(value) => parse_bool("SIP_WAIT_UNTIL_ANSWERED", value)?,
            None => false,
        };
        let environment = match optional("ENVIRONMENT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "ENVIRONMENT",
                value,
            })?,
            None => Environment::Production,
        };
        let listen_addr = optional("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid {
                var: "LISTEN_ADDR",
                value: listen_addr.clone(),
            })?;

        Ok(Self {
            livekit_url,
            livekit_api_key,
            livekit_api_secret,
            sip_trunk_id,
            krisp_enabled,
            environment,
            listen_addr,
            wait_until_answered,
        })
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { var, value }),
    }
}
