use std::{env, error::Error, fmt, num::NonZeroU64, path::PathBuf, str::FromStr, time::Duration};

use chrono::TimeDelta;
use log::warn;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MODEL_PATH: &str = "models/admission_model.json";
const DEFAULT_SECRET: &str = "admission-prediction-demo-secret";
const DEFAULT_TOKEN_TTL_MINUTES: NonZeroU64 = NonZeroU64::new(60).unwrap();
const DEFAULT_REQUEST_TIMEOUT_SECS: NonZeroU64 = NonZeroU64::new(30).unwrap();

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErr {
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErr::Invalid { key, value } => write!(f, "invalid value for {key}: '{value}'"),
        }
    }
}

impl Error for ConfigErr {}

/// Runtime settings of the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub secret: String,
    pub token_ttl: NonZeroU64,
    pub request_timeout: NonZeroU64,
    pub credentials_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Creates a new `ServiceConfig` with the defaults and the given secret.
    ///
    /// # Arguments
    /// * `model_path` - Location of the model artifact.
    /// * `secret` - The token signing secret.
    pub fn new<P: Into<PathBuf>>(model_path: P, secret: &str) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: model_path.into(),
            secret: secret.to_string(),
            token_ttl: DEFAULT_TOKEN_TTL_MINUTES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            credentials_path: None,
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// # Returns
    /// The configuration, with defaults for every unset variable.
    ///
    /// # Errors
    /// Returns `ConfigErr::Invalid` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigErr> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigErr>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let secret = match lookup("JWT_SECRET_KEY").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET_KEY is not set, using the built-in demo secret");
                DEFAULT_SECRET.to_string()
            }
        };

        let mut config = Self::new(
            lookup("MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string()),
            &secret,
        );

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }

        config.port = parse_or(&lookup, "PORT", config.port)?;
        config.token_ttl = parse_or(&lookup, "TOKEN_TTL_MINUTES", config.token_ttl)?;
        config.request_timeout = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", config.request_timeout)?;
        config.credentials_path = lookup("CREDENTIALS_PATH").map(PathBuf::from);

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_ttl(&self) -> TimeDelta {
        let minutes = i64::try_from(self.token_ttl.get()).unwrap_or(i64::MAX);
        TimeDelta::try_minutes(minutes).unwrap_or(TimeDelta::MAX)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.get())
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigErr>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigErr::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&'static str, &str)]) -> Result<ServiceConfig, ConfigErr> {
        let vars: HashMap<_, _> = vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.secret, DEFAULT_SECRET);
        assert_eq!(config.token_ttl(), TimeDelta::minutes(60));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.credentials_path, None);
    }

    #[test]
    fn programmatic_config_uses_the_defaults() {
        let config = ServiceConfig::new("model.json", "secret");

        assert_eq!(config.token_ttl.get(), 60);
        assert_eq!(config.request_timeout.get(), 30);
        assert_eq!(config.token_ttl(), TimeDelta::minutes(60));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("MODEL_PATH", "/srv/model.json"),
            ("JWT_SECRET_KEY", "s3cret"),
            ("TOKEN_TTL_MINUTES", "5"),
            ("REQUEST_TIMEOUT_SECS", "2"),
            ("CREDENTIALS_PATH", "/srv/users.json"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.token_ttl(), TimeDelta::minutes(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(2));
        assert_eq!(config.credentials_path, Some(PathBuf::from("/srv/users.json")));
    }

    #[test]
    fn rejects_unusable_values() {
        for (key, value) in [
            ("PORT", "http"),
            ("PORT", "70000"),
            ("TOKEN_TTL_MINUTES", "0"),
            ("REQUEST_TIMEOUT_SECS", "-1"),
        ] {
            let err = config_from(&[(key, value)]).unwrap_err();
            assert_eq!(
                err,
                ConfigErr::Invalid {
                    key,
                    value: value.to_string()
                }
            );
        }
    }

    #[test]
    fn empty_secret_falls_back_to_default() {
        let config = config_from(&[("JWT_SECRET_KEY", "")]).unwrap();
        assert_eq!(config.secret, DEFAULT_SECRET);
    }
}
