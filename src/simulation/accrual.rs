use crate::decimal::Money;
use crate::errors::{PayoffError, Result};

use super::working_set::WorkingSet;

/// result of paying one sub-period's minimum interest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodOutcome {
    pub interest_paid: Money,
    pub leftover: Money,
}

/// minimum-interest payments for the sub-periods of a month
#[derive(Debug, Clone, Copy)]
pub struct AccrualStep {
    frequency: u32,
}

impl AccrualStep {
    pub fn new(frequency: u32) -> Self {
        Self {
            frequency: frequency.max(1),
        }
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// interest owed by every active loan in one sub-period
    pub fn owed(&self, set: &WorkingSet) -> Money {
        set.active()
            .map(|(_, entry)| entry.monthly_interest().share(self.frequency))
            .sum()
    }

    /// pay each active loan's share of its monthly interest out of `funds`.
    ///
    /// The shortfall check runs before any balance moves, so a failed
    /// sub-period leaves the working set exactly as it was.
    pub fn pay_minimum(&self, set: &mut WorkingSet, funds: Money, month: u32, period: u32) -> Result<PeriodOutcome> {
        let owed = self.owed(set);
        if owed > funds {
            return Err(PayoffError::InsufficientFunds {
                month,
                period,
                payment: funds,
                owed,
            });
        }

        let mut interest_paid = Money::ZERO;
        for (_, entry) in set.iter_mut() {
            if !entry.is_active() {
                continue;
            }
            let share = entry.monthly_interest().share(self.frequency);
            interest_paid += entry.reduce(share);
        }

        Ok(PeriodOutcome {
            interest_paid,
            leftover: funds - interest_paid,
        })
    }

    /// add one month of interest to every remaining loan
    pub fn charge_month_interest(&self, set: &mut WorkingSet) -> Money {
        set.iter_mut().map(|(_, entry)| entry.charge_interest()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::simulation::working_set::WorkingEntry;

    fn two_loans() -> WorkingSet {
        WorkingSet::from_entries([
            (1, WorkingEntry::new("Car", Money::from_major(1_200), Rate::from_percentage(12))),
            (2, WorkingEntry::new("Card", Money::from_major(600), Rate::from_percentage(24))),
        ])
    }

    #[test]
    fn test_single_period_minimum() {
        let mut set = WorkingSet::from_entries([(
            1,
            WorkingEntry::new("Car", Money::from_major(1_200), Rate::from_percentage(12)),
        )]);
        let step = AccrualStep::new(1);

        let outcome = step.pay_minimum(&mut set, Money::from_major(50), 0, 1).unwrap();

        assert_eq!(outcome.interest_paid, Money::from_major(12));
        assert_eq!(outcome.leftover, Money::from_major(38));
        assert_eq!(set.get(1).unwrap().balance(), Money::from_major(1_188));
        assert_eq!(set.get(1).unwrap().monthly_interest(), Money::from_cents(1188));
    }

    #[test]
    fn test_shares_split_by_frequency() {
        let mut set = two_loans();
        let step = AccrualStep::new(2);

        // car owes 12 / 2, card owes 12 / 2
        assert_eq!(step.owed(&set), Money::from_major(12));

        let outcome = step.pay_minimum(&mut set, Money::from_major(20), 0, 1).unwrap();
        assert_eq!(outcome.leftover, Money::from_major(8));
        assert_eq!(set.get(1).unwrap().balance(), Money::from_major(1_194));
        assert_eq!(set.get(2).unwrap().balance(), Money::from_major(594));
    }

    #[test]
    fn test_insufficient_funds_leaves_set_untouched() {
        let mut set = two_loans();
        let before = set.clone();
        let step = AccrualStep::new(1);

        let err = step.pay_minimum(&mut set, Money::from_major(20), 3, 1).unwrap_err();

        assert_eq!(
            err,
            PayoffError::InsufficientFunds {
                month: 3,
                period: 1,
                payment: Money::from_major(20),
                owed: Money::from_major(24),
            }
        );
        assert_eq!(set, before);
    }

    #[test]
    fn test_exact_funds_are_enough() {
        let mut set = two_loans();
        let outcome = AccrualStep::new(1).pay_minimum(&mut set, Money::from_major(24), 0, 1).unwrap();
        assert_eq!(outcome.leftover, Money::ZERO);
    }

    #[test]
    fn test_paid_off_loans_owe_nothing() {
        let mut set = two_loans();
        set.get_mut(2).unwrap().reduce(Money::from_major(600));
        let step = AccrualStep::new(1);

        assert_eq!(step.owed(&set), Money::from_major(12));
        step.pay_minimum(&mut set, Money::from_major(12), 0, 1).unwrap();
        assert_eq!(set.get(2).unwrap().balance(), Money::ZERO);

        let charged = step.charge_month_interest(&mut set);
        assert_eq!(charged, Money::from_cents(1188));
        assert_eq!(set.get(2).unwrap().balance(), Money::ZERO);
    }
}
