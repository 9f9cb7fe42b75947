pub mod accrual;
pub mod engine;
pub mod recorder;
pub mod strategy;
pub mod working_set;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{PayoffError, Result};
use crate::types::{LoanId, OwnerId, Strategy};

pub use accrual::{AccrualStep, PeriodOutcome};
pub use engine::SimulationEngine;
pub use recorder::SnapshotRecorder;
pub use strategy::{Redistribution, Redistributor};
pub use working_set::{WorkingEntry, WorkingSet};

/// raw simulation form fields as submitted by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub payment: Option<String>,
    pub frequency: Option<String>,
    pub strategy: Option<String>,
    pub duration: Option<String>,
}

impl SimulationRequest {
    /// parse every field; nothing is mutated by a failed parse
    pub fn parse(&self, owner: OwnerId) -> Result<SimulationParams> {
        let payment = required("payment", &self.payment)?;
        let frequency = required("frequency", &self.frequency)?;
        let strategy = required("strategy", &self.strategy)?;
        let duration = required("duration", &self.duration)?;

        let payment = Money::from_str(payment)
            .map_err(|_| PayoffError::validation("payment", "must be a number"))?;
        let frequency = parse_count("frequency", frequency)?;
        let strategy = Strategy::from_str(strategy)?;
        let duration_months = parse_count("duration", duration)?;

        Ok(SimulationParams {
            owner,
            payment,
            frequency,
            strategy,
            duration_months,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PayoffError::validation(field, "is required")),
    }
}

fn parse_count(field: &'static str, value: &str) -> Result<u32> {
    value
        .parse::<u32>()
        .map_err(|_| PayoffError::validation(field, "must be a whole number"))
}

/// validated inputs of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub owner: OwnerId,
    /// budget available in each sub-period
    pub payment: Money,
    /// sub-periods per month
    pub frequency: u32,
    pub strategy: Strategy,
    pub duration_months: u32,
}

impl SimulationParams {
    pub fn new(owner: OwnerId, payment: Money, frequency: u32, strategy: Strategy, duration_months: u32) -> Self {
        Self {
            owner,
            payment,
            frequency,
            strategy,
            duration_months,
        }
    }

    pub fn validate(&self, config: &EngineConfig) -> Result<()> {
        if !self.payment.is_positive() {
            return Err(PayoffError::validation("payment", "must be greater than zero"));
        }
        if self.frequency == 0 || self.frequency > config.max_frequency {
            return Err(PayoffError::validation(
                "frequency",
                format!("must be between 1 and {}", config.max_frequency),
            ));
        }
        if self.duration_months == 0 || self.duration_months > config.max_duration_months {
            return Err(PayoffError::validation(
                "duration",
                format!("must be between 1 and {} months", config.max_duration_months),
            ));
        }
        Ok(())
    }
}

/// summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub owner: OwnerId,
    pub strategy: Strategy,
    pub start_date: Option<NaiveDate>,
    pub months_run: u32,
    pub snapshots_recorded: usize,
    /// projected balance of each loan after the last month
    pub final_balances: BTreeMap<LoanId, Money>,
    /// month in which each loan's projected balance reached zero
    pub payoff_dates: BTreeMap<LoanId, NaiveDate>,
    /// minimum interest covered by the periodic payments
    pub interest_paid: Money,
    /// interest added at month ends
    pub interest_charged: Money,
}

impl SimulationReport {
    /// report for an owner with nothing to simulate
    pub fn empty(owner: OwnerId, strategy: Strategy) -> Self {
        Self {
            owner,
            strategy,
            start_date: None,
            months_run: 0,
            snapshots_recorded: 0,
            final_balances: BTreeMap::new(),
            payoff_dates: BTreeMap::new(),
            interest_paid: Money::ZERO,
            interest_charged: Money::ZERO,
        }
    }

    pub fn remaining_balance(&self) -> Money {
        self.final_balances.values().copied().sum()
    }

    pub fn is_debt_free(&self) -> bool {
        !self.final_balances.is_empty() && self.final_balances.values().all(|b| !b.is_positive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(payment: &str, frequency: &str, strategy: &str, duration: &str) -> SimulationRequest {
        SimulationRequest {
            payment: Some(payment.to_string()),
            frequency: Some(frequency.to_string()),
            strategy: Some(strategy.to_string()),
            duration: Some(duration.to_string()),
        }
    }

    #[test]
    fn test_parse_valid_request() {
        let params = form("250.50", "2", "avalanche", "12").parse(9).unwrap();

        assert_eq!(params.owner, 9);
        assert_eq!(params.payment, Money::from_cents(25_050));
        assert_eq!(params.frequency, 2);
        assert_eq!(params.strategy, Strategy::Avalanche);
        assert_eq!(params.duration_months, 12);
    }

    #[test]
    fn test_parse_missing_fields() {
        let mut request = form("100", "1", "avalanche", "6");
        request.duration = None;
        assert_eq!(
            request.parse(1),
            Err(PayoffError::validation("duration", "is required"))
        );

        let mut request = form("100", "1", "avalanche", "6");
        request.payment = Some("   ".to_string());
        assert_eq!(
            request.parse(1),
            Err(PayoffError::validation("payment", "is required"))
        );
    }

    #[test]
    fn test_parse_non_numeric_fields() {
        assert!(matches!(
            form("lots", "1", "avalanche", "6").parse(1),
            Err(PayoffError::Validation { field: "payment", .. })
        ));
        assert!(matches!(
            form("100", "1.5", "avalanche", "6").parse(1),
            Err(PayoffError::Validation { field: "frequency", .. })
        ));
        assert!(matches!(
            form("100", "1", "avalanche", "-3").parse(1),
            Err(PayoffError::Validation { field: "duration", .. })
        ));
        assert!(matches!(
            form("100", "1", "cheapest", "6").parse(1),
            Err(PayoffError::Validation { field: "strategy", .. })
        ));
    }

    #[test]
    fn test_validate_ranges() {
        let config = EngineConfig::standard();
        let ok = SimulationParams::new(1, Money::from_major(100), 1, Strategy::Avalanche, 12);
        assert!(ok.validate(&config).is_ok());

        let zero_payment = SimulationParams { payment: Money::ZERO, ..ok.clone() };
        assert!(matches!(zero_payment.validate(&config), Err(PayoffError::Validation { field: "payment", .. })));

        let zero_frequency = SimulationParams { frequency: 0, ..ok.clone() };
        assert!(matches!(zero_frequency.validate(&config), Err(PayoffError::Validation { field: "frequency", .. })));

        let zero_duration = SimulationParams { duration_months: 0, ..ok.clone() };
        assert!(matches!(zero_duration.validate(&config), Err(PayoffError::Validation { field: "duration", .. })));

        let too_long = SimulationParams { duration_months: 601, ..ok };
        assert!(too_long.validate(&config).is_err());
    }
}
