use std::{env, str::FromStr, time::Duration};

use async_trait::async_trait;
use service::{
    config::{Config, ConfigService},
    ServiceError,
};
use tracing::warn;

const BULK_CREATE_DELAY_MS: &str = "BULK_CREATE_DELAY_MS";
const MAX_RANGE_DAYS: &str = "MAX_RANGE_DAYS";

/// Reads the scheduler tunables from the environment unless a fixed
/// configuration was given.
#[derive(Default)]
pub struct ConfigServiceImpl {
    fixed: Option<Config>,
}

impl ConfigServiceImpl {
    pub fn from_env() -> Self {
        Self { fixed: None }
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            fixed: Some(config),
        }
    }
}

fn env_or<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value {value:?} for {name}");
            default
        }),
        Err(_) => default,
    }
}

#[async_trait]
impl ConfigService for ConfigServiceImpl {
    async fn get_config(&self) -> Result<Config, ServiceError> {
        if let Some(config) = &self.fixed {
            return Ok(config.clone());
        }
        let defaults = Config::default();
        let delay_ms = env_or(
            BULK_CREATE_DELAY_MS,
            defaults.bulk_create_delay.as_millis() as u64,
        );
        let max_range_days = env_or(MAX_RANGE_DAYS, defaults.max_range_days);

        Ok(Config {
            bulk_create_delay: Duration::from_millis(delay_ms),
            max_range_days,
        })
    }
}
