//! Configuration for the withdrawal orchestrator

use crate::domain::banknote::Denominations;
use crate::error::{AtmError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// What to do with a successful charge when the depot then fails to release cash.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum RefundPolicy {
    /// Ask the account charger to reverse the charge straight away.
    #[default]
    Compensate,
    /// Leave the charge in place and flag the withdrawal for manual correction.
    ManualReconciliation,
}

/// Notes released per withdrawal when nothing else is configured.
pub const DEFAULT_MAX_NOTES: u32 = 200;

/// Upper bound accepted for `max_notes`.
pub const MAX_NOTES_CEILING: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmConfig {
    /// Face values the machine dispenses
    pub denominations: Denominations,

    /// Handling of a charge whose cash could not be released
    pub refund_policy: RefundPolicy,

    /// Most notes a single withdrawal may be paid out in
    pub max_notes: u32,
}

impl Default for AtmConfig {
    fn default() -> Self {
        Self {
            denominations: Denominations::default(),
            refund_policy: RefundPolicy::default(),
            max_notes: DEFAULT_MAX_NOTES,
        }
    }
}

impl AtmConfig {
    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_notes == 0 || self.max_notes > MAX_NOTES_CEILING {
            return Err(AtmError::Config(format!(
                "max_notes must be between 1 and {}, got {}",
                MAX_NOTES_CEILING, self.max_notes
            )));
        }
        Ok(())
    }
}

/// Builder for AtmConfig
pub struct AtmConfigBuilder {
    denominations: Option<Vec<u32>>,
    refund_policy: RefundPolicy,
    max_notes: u32,
}

impl AtmConfigBuilder {
    pub fn new() -> Self {
        Self {
            denominations: None,
            refund_policy: RefundPolicy::default(),
            max_notes: DEFAULT_MAX_NOTES,
        }
    }

    pub fn denominations(mut self, values: Vec<u32>) -> Self {
        self.denominations = Some(values);
        self
    }

    pub fn refund_policy(mut self, policy: RefundPolicy) -> Self {
        self.refund_policy = policy;
        self
    }

    pub fn max_notes(mut self, max_notes: u32) -> Self {
        self.max_notes = max_notes;
        self
    }

    pub fn build(self) -> Result<AtmConfig> {
        let denominations = match self.denominations {
            Some(values) => Denominations::new(values)?,
            None => Denominations::default(),
        };
        let config = AtmConfig {
            denominations,
            refund_policy: self.refund_policy,
            max_notes: self.max_notes,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for AtmConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
