use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Configuration for the subscriptions module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionsConfig {
    #[serde(default = "default_max_service_name_length")]
    pub max_service_name_length: usize,
}

impl Default for SubscriptionsConfig {
    fn default() -> Self {
        Self {
            max_service_name_length: default_max_service_name_length(),
        }
    }
}

fn default_max_service_name_length() -> usize {
    255
}

impl From<&SubscriptionsConfig> for ServiceConfig {
    fn from(cfg: &SubscriptionsConfig) -> Self {
        Self {
            max_service_name_length: cfg.max_service_name_length,
        }
    }
}
