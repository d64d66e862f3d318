use serde::{Deserialize, Serialize};

use crate::domain::identifier::DEFAULT_PREFIX;
use crate::domain::service::ServiceConfig;

/// Configuration for the employees module (`modules.employees` in the app config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmployeesConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    #[serde(default = "default_search_limit")]
    pub search_limit: u64,
    #[serde(default = "default_recent_count")]
    pub recent_count: u64,
    #[serde(default = "default_identifier_prefix")]
    pub identifier_prefix: String,
    #[serde(default = "default_max_identifier_attempts")]
    pub max_identifier_attempts: u32,
}

impl Default for EmployeesConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            search_limit: default_search_limit(),
            recent_count: default_recent_count(),
            identifier_prefix: default_identifier_prefix(),
            max_identifier_attempts: default_max_identifier_attempts(),
        }
    }
}

impl From<EmployeesConfig> for ServiceConfig {
    fn from(cfg: EmployeesConfig) -> Self {
        Self {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
            search_limit: cfg.search_limit,
            recent_count: cfg.recent_count,
            identifier_prefix: cfg.identifier_prefix,
            max_identifier_attempts: cfg.max_identifier_attempts,
        }
    }
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    100
}

fn default_search_limit() -> u64 {
    10
}

fn default_recent_count() -> u64 {
    5
}

fn default_identifier_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_max_identifier_attempts() -> u32 {
    5
}
