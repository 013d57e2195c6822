//! Configuration module for the billing engine.

use crate::error::BillingError;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

/// Engine-wide rate defaults, applied when a room carries no overrides.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Currency per presence day of water usage.
    pub daily_water_rate: Decimal,
    /// Currency per metered electricity unit.
    pub electricity_unit_rate: Decimal,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_water_rate: Decimal::from(5),
            electricity_unit_rate: Decimal::from(16),
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, BillingError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            daily_water_rate: parse_rate("DAILY_WATER_RATE", defaults.daily_water_rate)?,
            electricity_unit_rate: parse_rate(
                "ELECTRICITY_UNIT_RATE",
                defaults.electricity_unit_rate,
            )?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }
}

fn parse_rate(var: &str, default: Decimal) -> Result<Decimal, BillingError> {
    match env::var(var) {
        Ok(raw) => {
            let value = Decimal::from_str(&raw)
                .map_err(|_| BillingError::ConfigError(format!("{} must be a decimal", var)))?;
            if value < Decimal::ZERO {
                return Err(BillingError::ConfigError(format!(
                    "{} must not be negative",
                    var
                )));
            }
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}
