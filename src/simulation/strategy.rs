use crate::decimal::Money;
use crate::errors::{PayoffError, Result};
use crate::types::{LoanId, Strategy};

use super::working_set::WorkingSet;

/// how leftover funds were spread over the working set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redistribution {
    /// (loan, amount) in the order payments were made
    pub applied: Vec<(LoanId, Money)>,
    pub paid_off: Vec<LoanId>,
    pub leftover: Money,
}

/// applies leftover funds according to a supported strategy
#[derive(Debug, Clone, Copy)]
pub struct Redistributor {
    strategy: Strategy,
}

impl Redistributor {
    /// fails for strategies that have no redistribution rule yet
    pub fn new(strategy: Strategy) -> Result<Self> {
        strategy.ensure_supported()?;
        Ok(Self { strategy })
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn apply(&self, set: &mut WorkingSet, funds: Money) -> Result<Redistribution> {
        match self.strategy {
            Strategy::Avalanche => Ok(avalanche(set, funds)),
            Strategy::Snowball | Strategy::Weighted => Err(PayoffError::UnsupportedStrategy {
                strategy: self.strategy,
            }),
        }
    }
}

/// active loan with the highest monthly interest, lowest id on ties
fn highest_interest(set: &WorkingSet) -> Option<LoanId> {
    let mut best: Option<(LoanId, Money)> = None;
    for (id, entry) in set.active() {
        match best {
            Some((_, interest)) if entry.monthly_interest() <= interest => {}
            _ => best = Some((id, entry.monthly_interest())),
        }
    }
    best.map(|(id, _)| id)
}

fn avalanche(set: &mut WorkingSet, funds: Money) -> Redistribution {
    let mut result = Redistribution::default();
    let mut remaining = funds;

    while remaining.is_positive() {
        let Some(id) = highest_interest(set) else {
            break;
        };
        let Some(entry) = set.get_mut(id) else {
            break;
        };

        if entry.balance() < remaining {
            let paid = entry.reduce(entry.balance());
            remaining -= paid;
            result.applied.push((id, paid));
            result.paid_off.push(id);
        } else {
            let paid = entry.reduce(remaining);
            remaining = Money::ZERO;
            result.applied.push((id, paid));
            if !entry.is_active() {
                result.paid_off.push(id);
            }
        }
    }

    result.leftover = remaining;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::simulation::working_set::WorkingEntry;
    use rust_decimal_macros::dec;

    fn entry(label: &str, balance: i64, rate_pct: u32) -> WorkingEntry {
        WorkingEntry::new(label, Money::from_major(balance), Rate::from_percentage(rate_pct))
    }

    #[test]
    fn test_avalanche_targets_highest_interest() {
        // A: 100 at 120% -> 10/month, B: 50 at 480% -> 20/month
        let mut set = WorkingSet::from_entries([(1, entry("A", 100, 120)), (2, entry("B", 50, 480))]);
        assert_eq!(set.get(1).unwrap().monthly_interest(), Money::from_major(10));
        assert_eq!(set.get(2).unwrap().monthly_interest(), Money::from_major(20));

        let result = Redistributor::new(Strategy::Avalanche)
            .unwrap()
            .apply(&mut set, Money::from_major(30))
            .unwrap();

        assert_eq!(result.leftover, Money::ZERO);
        assert_eq!(result.applied, vec![(2, Money::from_major(30))]);
        assert!(result.paid_off.is_empty());
        assert_eq!(set.get(2).unwrap().balance(), Money::from_major(20));
        assert_eq!(set.get(2).unwrap().monthly_interest(), Money::from_major(8));
        assert_eq!(set.get(1).unwrap().balance(), Money::from_major(100));
    }

    #[test]
    fn test_avalanche_rolls_over_after_payoff() {
        let mut set = WorkingSet::from_entries([(1, entry("A", 100, 120)), (2, entry("B", 50, 480))]);

        let result = Redistributor::new(Strategy::Avalanche)
            .unwrap()
            .apply(&mut set, Money::from_major(70))
            .unwrap();

        assert_eq!(result.paid_off, vec![2]);
        assert_eq!(result.applied, vec![(2, Money::from_major(50)), (1, Money::from_major(20))]);
        assert_eq!(set.get(2).unwrap().balance(), Money::ZERO);
        assert_eq!(set.get(1).unwrap().balance(), Money::from_major(80));
        assert_eq!(result.leftover, Money::ZERO);
    }

    #[test]
    fn test_avalanche_exact_balance_clears_loan() {
        let mut set = WorkingSet::from_entries([(1, entry("A", 100, 120)), (2, entry("B", 50, 480))]);

        let result = avalanche(&mut set, Money::from_major(50));

        assert_eq!(result.paid_off, vec![2]);
        assert_eq!(set.get(2).unwrap().balance(), Money::ZERO);
        assert_eq!(set.get(1).unwrap().balance(), Money::from_major(100));
    }

    #[test]
    fn test_avalanche_keeps_surplus_when_everything_is_paid() {
        let mut set = WorkingSet::from_entries([(1, entry("A", 10, 12)), (2, entry("B", 5, 36))]);

        let result = avalanche(&mut set, Money::from_major(100));

        assert_eq!(result.paid_off, vec![2, 1]);
        assert_eq!(result.leftover, Money::from_major(85));
        assert_eq!(set.total_balance(), Money::ZERO);
    }

    #[test]
    fn test_avalanche_zero_funds_is_a_no_op() {
        let mut set = WorkingSet::from_entries([(1, entry("A", 100, 12))]);
        let before = set.clone();

        let result = avalanche(&mut set, Money::ZERO);

        assert!(result.applied.is_empty());
        assert_eq!(set, before);
    }

    #[test]
    fn test_avalanche_tie_goes_to_lowest_id() {
        // same balance and rate -> identical monthly interest
        let mut set = WorkingSet::from_entries([(7, entry("Later", 100, 12)), (3, entry("Earlier", 100, 12))]);

        let result = avalanche(&mut set, Money::from_major(10));

        assert_eq!(result.applied, vec![(3, Money::from_major(10))]);
        assert_eq!(set.get(7).unwrap().balance(), Money::from_major(100));
    }

    #[test]
    fn test_avalanche_zero_rate_loans_still_receive_funds() {
        let mut set = WorkingSet::from_entries([
            (1, WorkingEntry::new("Family", Money::from_major(40), Rate::ZERO)),
            (2, WorkingEntry::new("Card", Money::from_major(20), Rate::from_decimal(dec!(0.18)))),
        ]);

        let result = avalanche(&mut set, Money::from_major(30));

        assert_eq!(result.applied, vec![(2, Money::from_major(20)), (1, Money::from_major(10))]);
        assert_eq!(set.get(1).unwrap().balance(), Money::from_major(30));
    }

    #[test]
    fn test_reserved_strategies_fail_at_construction() {
        for strategy in [Strategy::Snowball, Strategy::Weighted] {
            let err = Redistributor::new(strategy).unwrap_err();
            assert_eq!(err, PayoffError::UnsupportedStrategy { strategy });
        }
    }

    #[test]
    fn test_reserved_strategy_apply_moves_nothing() {
        let mut set = WorkingSet::from_entries([(1, entry("Card", 500, 24))]);
        let redistributor = Redistributor {
            strategy: Strategy::Weighted,
        };

        let err = redistributor.apply(&mut set, Money::from_major(50)).unwrap_err();

        assert_eq!(err, PayoffError::UnsupportedStrategy { strategy: Strategy::Weighted });
        assert_eq!(set.total_balance(), Money::from_major(500));
    }
}
