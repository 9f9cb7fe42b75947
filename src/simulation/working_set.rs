use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{PayoffError, Result};
use crate::loan::Loan;
use crate::types::{LoanId, OwnerId};

/// transient copy of one loan mutated by a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingEntry {
    balance: Money,
    rate: Rate,
    monthly_interest: Money,
    pub label: String,
}

impl WorkingEntry {
    pub fn new(label: impl Into<String>, balance: Money, rate: Rate) -> Self {
        let balance = balance.max(Money::ZERO);
        Self {
            balance,
            rate,
            monthly_interest: balance.monthly_interest(rate),
            label: label.into(),
        }
    }

    pub fn from_loan(loan: &Loan) -> Self {
        Self::new(loan.name.clone(), loan.balance, loan.rate)
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn monthly_interest(&self) -> Money {
        self.monthly_interest
    }

    /// still owes something
    pub fn is_active(&self) -> bool {
        self.balance.is_positive()
    }

    /// reduce the balance, never below zero; returns the amount taken
    pub fn reduce(&mut self, amount: Money) -> Money {
        let taken = amount.min(self.balance).max(Money::ZERO);
        self.balance -= taken;
        self.recompute();
        taken
    }

    /// add the current monthly interest onto the balance
    pub fn charge_interest(&mut self) -> Money {
        if !self.is_active() {
            return Money::ZERO;
        }
        let interest = self.monthly_interest;
        self.balance += interest;
        self.recompute();
        interest
    }

    fn recompute(&mut self) {
        self.monthly_interest = self.balance.monthly_interest(self.rate);
    }
}

/// loan id to working entry, iterated in id order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingSet {
    entries: BTreeMap<LoanId, WorkingEntry>,
}

impl WorkingSet {
    /// project an owner's loans into a working set
    pub fn build(owner: OwnerId, loans: &[Loan]) -> Result<Self> {
        if loans.is_empty() {
            return Err(PayoffError::EmptyWorkingSet { owner });
        }
        let entries = loans
            .iter()
            .map(|loan| (loan.id, WorkingEntry::from_loan(loan)))
            .collect();
        Ok(Self { entries })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (LoanId, WorkingEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: LoanId) -> Option<&WorkingEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: LoanId) -> Option<&mut WorkingEntry> {
        self.entries.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LoanId, &WorkingEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (LoanId, &mut WorkingEntry)> {
        self.entries.iter_mut().map(|(id, entry)| (*id, entry))
    }

    pub fn active(&self) -> impl Iterator<Item = (LoanId, &WorkingEntry)> {
        self.iter().filter(|(_, entry)| entry.is_active())
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }

    pub fn total_balance(&self) -> Money {
        self.entries.values().map(|entry| entry.balance).sum()
    }

    pub fn balances(&self) -> BTreeMap<LoanId, Money> {
        self.entries.iter().map(|(id, entry)| (*id, entry.balance)).collect()
    }
}
