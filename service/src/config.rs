use std::time::Duration;

use crate::ServiceError;
use async_trait::async_trait;
use mockall::automock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Pause between the individual creations of a bulk or copy-week run.
    pub bulk_create_delay: Duration,
    /// Largest number of days a range query or a bulk run may span.
    pub max_range_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bulk_create_delay: Duration::from_millis(100),
            max_range_days: 62,
        }
    }
}

#[automock]
#[async_trait]
pub trait ConfigService {
    async fn get_config(&self) -> Result<Config, ServiceError>;
}
