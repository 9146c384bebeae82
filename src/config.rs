//! Environment-driven configuration.
//!
//! `.env` is loaded by `main` through dotenvy before [`Config::from_env`] runs.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::pricing::PricingPolicy;

/// Business rules that vary per deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePolicy {
    /// Balance installment is due this many days before the event
    pub balance_due_days_before_event: i64,
    /// Honor the versioned Sunday rule amount instead of the legacy $100
    pub sunday_discount_from_rule: bool,
    /// Users allowed to mark a contract dead
    pub contract_admins: Vec<String>,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            balance_due_days_before_event: 60,
            sunday_discount_from_rule: false,
            contract_admins: Vec::new(),
        }
    }
}

impl EnginePolicy {
    pub fn pricing(&self) -> PricingPolicy {
        PricingPolicy {
            sunday_discount_from_rule: self.sunday_discount_from_rule,
        }
    }

    pub fn is_contract_admin(&self, user: &str) -> bool {
        self.contract_admins.iter().any(|admin| admin == user)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub catalog_cache_ttl: Duration,
    pub status_sweep_interval: Duration,
    pub policy: EnginePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Configuration("DATABASE_URL must be set".to_string()))?;

        let contract_admins = env::var("CONTRACT_ADMINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 20)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3000)?,
            catalog_cache_ttl: Duration::from_secs(parse_var("CATALOG_CACHE_TTL_SECS", 10 * 60)?),
            status_sweep_interval: Duration::from_secs(parse_var(
                "STATUS_SWEEP_INTERVAL_SECS",
                24 * 60 * 60,
            )?),
            policy: EnginePolicy {
                balance_due_days_before_event: parse_var("BALANCE_DUE_DAYS_BEFORE_EVENT", 60)?,
                sunday_discount_from_rule: parse_var("SUNDAY_DISCOUNT_FROM_RULE", false)?,
                contract_admins,
            },
        })
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
