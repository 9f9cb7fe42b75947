use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{PayoffError, Result};

/// identifier of a persisted loan
pub type LoanId = u64;

/// identifier of the user owning loans and snapshots
pub type OwnerId = u64;

/// identifier of a persisted simulation snapshot
pub type SnapshotId = Uuid;

/// payoff strategy for leftover funds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// highest interest cost first
    Avalanche,
    /// smallest balance first (reserved)
    Snowball,
    /// proportional split (reserved)
    Weighted,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Avalanche, Strategy::Snowball, Strategy::Weighted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Avalanche => "avalanche",
            Strategy::Snowball => "snowball",
            Strategy::Weighted => "weighted",
        }
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self, Strategy::Avalanche)
    }

    /// reject strategies that are named but have no redistribution rule
    pub fn ensure_supported(&self) -> Result<()> {
        if self.is_implemented() {
            Ok(())
        } else {
            Err(PayoffError::UnsupportedStrategy { strategy: *self })
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = PayoffError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Strategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PayoffError::validation("strategy", format!("unknown strategy '{}'", wanted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("avalanche".parse::<Strategy>().unwrap(), Strategy::Avalanche);
        assert_eq!(" Snowball ".parse::<Strategy>().unwrap(), Strategy::Snowball);
        assert_eq!("weighted".parse::<Strategy>().unwrap(), Strategy::Weighted);

        let err = "fastest".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, PayoffError::Validation { field: "strategy", .. }));
    }

    #[test]
    fn test_reserved_strategies_are_reported() {
        assert!(Strategy::Avalanche.ensure_supported().is_ok());
        assert_eq!(
            Strategy::Snowball.ensure_supported(),
            Err(PayoffError::UnsupportedStrategy { strategy: Strategy::Snowball })
        );
        assert_eq!(
            Strategy::Weighted.ensure_supported(),
            Err(PayoffError::UnsupportedStrategy { strategy: Strategy::Weighted })
        );
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&Strategy::Avalanche).unwrap();
        assert_eq!(json, "\"avalanche\"");
    }
}
