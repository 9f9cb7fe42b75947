use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::CENTS_DP;
use crate::errors::{PayoffError, Result};

/// when simulated snapshot rows reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// clear up front, commit each finished month; an abort keeps earlier months
    PerMonth,
    /// clear and commit only once every month has finished
    Atomic,
}

/// simulation engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub commit_mode: CommitMode,
    /// decimal places kept on recorded snapshot balances
    pub snapshot_dp: u32,
    /// fixed first snapshot date; the time provider's date when unset
    pub start_date: Option<NaiveDate>,
    pub max_duration_months: u32,
    pub max_frequency: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl EngineConfig {
    /// month-by-month commits
    pub fn standard() -> Self {
        Self {
            commit_mode: CommitMode::PerMonth,
            snapshot_dp: CENTS_DP,
            start_date: None,
            max_duration_months: 600,
            max_frequency: 31,
        }
    }

    /// all-or-nothing runs
    pub fn transactional() -> Self {
        Self {
            commit_mode: CommitMode::Atomic,
            ..Self::standard()
        }
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.snapshot_dp > 8 {
            return Err(PayoffError::InvalidConfiguration {
                message: format!("snapshot_dp must be at most 8, got {}", self.snapshot_dp),
            });
        }
        if self.max_duration_months == 0 || self.max_frequency == 0 {
            return Err(PayoffError::InvalidConfiguration {
                message: "limits must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
