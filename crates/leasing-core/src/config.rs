//! Calculator configuration.
//!
//! The default leaser is injected here rather than read from a global, so
//! every calculation is a pure function of its arguments.

use serde::{Deserialize, Serialize};

use crate::error::LeasingError;
use crate::leaser::rate_table::Leaser;
use crate::LeasingResult;

/// What to do when no bracket of a rate table contains the amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Use the first bracket's coefficient and report the fallback
    #[default]
    FallbackToFirst,
    /// Fail with `NoMatchingRange`
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Substituted when an offer has no leaser or an empty rate table
    pub default_leaser: Leaser,
    pub range_policy: RangePolicy,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        CalculatorConfig {
            default_leaser: Leaser::standard(),
            range_policy: RangePolicy::default(),
        }
    }
}

impl CalculatorConfig {
    pub fn strict() -> Self {
        CalculatorConfig {
            range_policy: RangePolicy::Strict,
            ..Default::default()
        }
    }

    pub fn with_default_leaser(mut self, leaser: Leaser) -> Self {
        self.default_leaser = leaser;
        self
    }

    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = policy;
        self
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> LeasingResult<Self> {
        let config: CalculatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The default leaser is the last resort of every lookup, so it must
    /// carry at least one bracket.
    pub fn validate(&self) -> LeasingResult<()> {
        if !self.default_leaser.has_ranges() {
            return Err(LeasingError::ConfigError(format!(
                "default leaser '{}' has no ranges",
                self.default_leaser.name
            )));
        }
        Ok(())
    }
}
