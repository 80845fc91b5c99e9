pub mod physna;

use std::time::Duration;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ApiClientBox;
use crate::domain::models::Tenant;

pub struct ApiClientManager {}

impl ApiClientManager {
    pub fn get(tenant: &Tenant) -> Result<ApiClientBox> {
        let timeout = Config::get(ConfigKey::Timeout)
            .parse::<u64>()
            .or_else(|_| Config::default(ConfigKey::Timeout).parse::<u64>())?;

        let match_threshold = Config::get(ConfigKey::MatchThreshold)
            .parse::<f64>()
            .or_else(|_| Config::default(ConfigKey::MatchThreshold).parse::<f64>())?;

        return Ok(Box::new(physna::Physna::new(
            tenant,
            Duration::from_millis(timeout),
            match_threshold,
        )?));
    }
}
