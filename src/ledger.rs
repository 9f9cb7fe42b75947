use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::decimal::Money;
use crate::errors::{PayoffError, Result};
use crate::loan::{Loan, LoanUpdate, NewLoan};
use crate::snapshot::{Snapshot, SnapshotChart};
use crate::types::{LoanId, OwnerId};

/// owner-scoped access to persisted loans
pub trait LoanLedger {
    fn loans_for_owner(&self, owner: OwnerId) -> Result<Vec<Loan>>;

    fn find_loan(&self, owner: OwnerId, id: LoanId) -> Result<Loan>;

    fn create_loan(&mut self, owner: OwnerId, new_loan: NewLoan) -> Result<Loan>;

    fn update_loan(&mut self, owner: OwnerId, id: LoanId, update: LoanUpdate) -> Result<Loan>;

    fn record_payment(&mut self, owner: OwnerId, id: LoanId, amount: Money) -> Result<Loan>;

    /// add one month of interest to every loan of the owner, returns total interest
    fn accrue_monthly_interest(&mut self, owner: OwnerId) -> Result<Money>;

    /// delete the loan row only; dependents are handled by `delete_loan_cascade`
    fn delete_loan(&mut self, owner: OwnerId, id: LoanId) -> Result<Loan>;
}

/// persisted simulation output
pub trait SnapshotStore {
    /// delete every snapshot of the owner, returns rows removed
    fn clear_snapshots(&mut self, owner: OwnerId) -> Result<usize>;

    fn delete_snapshots_for_loan(&mut self, owner: OwnerId, loan_id: LoanId) -> Result<usize>;

    fn insert_snapshots(&mut self, snapshots: Vec<Snapshot>) -> Result<()>;

    fn snapshots_for_owner(&self, owner: OwnerId) -> Result<Vec<Snapshot>>;

    /// swap the owner's snapshots for `snapshots`, returns rows removed.
    ///
    /// On error the owner's previous rows are put back. Stores with real
    /// transactions should override this.
    fn replace_snapshots(&mut self, owner: OwnerId, snapshots: Vec<Snapshot>) -> Result<usize> {
        let prior = self.snapshots_for_owner(owner)?;
        let removed = self.clear_snapshots(owner)?;
        if let Err(err) = self.insert_snapshots(snapshots) {
            if let Err(restore) = self.insert_snapshots(prior) {
                warn!(owner, error = %restore, "could not restore snapshots");
            }
            return Err(err);
        }
        Ok(removed)
    }

    fn chart(&self, owner: OwnerId) -> Result<SnapshotChart> {
        let snapshots = self.snapshots_for_owner(owner)?;
        Ok(SnapshotChart::from_snapshots(owner, &snapshots))
    }
}

/// delete a loan after removing the snapshot rows that reference it
pub fn delete_loan_cascade<L, S>(ledger: &mut L, snapshots: &mut S, owner: OwnerId, id: LoanId) -> Result<Loan>
where
    L: LoanLedger + ?Sized,
    S: SnapshotStore + ?Sized,
{
    // fail before touching dependents if the loan is not the owner's
    ledger.find_loan(owner, id)?;

    let removed = snapshots.delete_snapshots_for_loan(owner, id)?;
    let loan = ledger.delete_loan(owner, id)?;
    info!(owner, loan_id = id, snapshots_removed = removed, "loan deleted");
    Ok(loan)
}

/// in-memory loan ledger
#[derive(Debug, Default)]
pub struct MemoryLedger {
    loans: BTreeMap<LoanId, Loan>,
    next_id: LoanId,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            loans: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn owned_mut(&mut self, owner: OwnerId, id: LoanId) -> Result<&mut Loan> {
        self.loans
            .get_mut(&id)
            .filter(|loan| loan.owner == owner)
            .ok_or(PayoffError::LoanNotFound { id })
    }
}

impl LoanLedger for MemoryLedger {
    fn loans_for_owner(&self, owner: OwnerId) -> Result<Vec<Loan>> {
        Ok(self.loans.values().filter(|loan| loan.owner == owner).cloned().collect())
    }

    fn find_loan(&self, owner: OwnerId, id: LoanId) -> Result<Loan> {
        self.loans
            .get(&id)
            .filter(|loan| loan.owner == owner)
            .cloned()
            .ok_or(PayoffError::LoanNotFound { id })
    }

    fn create_loan(&mut self, owner: OwnerId, new_loan: NewLoan) -> Result<Loan> {
        // ids start at 1 even for a `Default` ledger
        let id = self.next_id.max(1);
        let loan = Loan::open(id, owner, new_loan)?;
        self.next_id = id + 1;
        self.loans.insert(id, loan.clone());
        debug!(owner, loan_id = id, name = %loan.name, "loan created");
        Ok(loan)
    }

    fn update_loan(&mut self, owner: OwnerId, id: LoanId, update: LoanUpdate) -> Result<Loan> {
        let loan = self.owned_mut(owner, id)?;
        loan.apply_update(update)?;
        Ok(loan.clone())
    }

    fn record_payment(&mut self, owner: OwnerId, id: LoanId, amount: Money) -> Result<Loan> {
        let loan = self.owned_mut(owner, id)?;
        loan.apply_payment(amount)?;
        debug!(owner, loan_id = id, %amount, balance = %loan.balance, "payment recorded");
        Ok(loan.clone())
    }

    fn accrue_monthly_interest(&mut self, owner: OwnerId) -> Result<Money> {
        let total = self
            .loans
            .values_mut()
            .filter(|loan| loan.owner == owner)
            .map(|loan| loan.accrue_month())
            .sum();
        Ok(total)
    }

    fn delete_loan(&mut self, owner: OwnerId, id: LoanId) -> Result<Loan> {
        self.owned_mut(owner, id)?;
        self.loans.remove(&id).ok_or(PayoffError::LoanNotFound { id })
    }
}

/// in-memory snapshot table
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    rows: Vec<Snapshot>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn clear_snapshots(&mut self, owner: OwnerId) -> Result<usize> {
        let before = self.rows.len();
        self.rows.retain(|row| row.owner != owner);
        Ok(before - self.rows.len())
    }

    fn delete_snapshots_for_loan(&mut self, owner: OwnerId, loan_id: LoanId) -> Result<usize> {
        let before = self.rows.len();
        self.rows.retain(|row| !(row.owner == owner && row.loan_id == loan_id));
        Ok(before - self.rows.len())
    }

    fn insert_snapshots(&mut self, snapshots: Vec<Snapshot>) -> Result<()> {
        if let Some(duplicate) = snapshots.iter().find(|s| self.rows.iter().any(|row| row.id == s.id)) {
            return Err(PayoffError::Storage {
                message: format!("duplicate snapshot id {}", duplicate.id),
            });
        }
        self.rows.extend(snapshots);
        Ok(())
    }

    fn snapshots_for_owner(&self, owner: OwnerId) -> Result<Vec<Snapshot>> {
        Ok(self.rows.iter().filter(|row| row.owner == owner).cloned().collect())
    }

    fn replace_snapshots(&mut self, owner: OwnerId, snapshots: Vec<Snapshot>) -> Result<usize> {
        let kept = self.rows.iter().filter(|row| row.owner != owner);
        let mut seen = HashSet::new();
        for id in kept.map(|row| row.id).chain(snapshots.iter().map(|s| s.id)) {
            if !seen.insert(id) {
                return Err(PayoffError::Storage {
                    message: format!("duplicate snapshot id {}", id),
                });
            }
        }
        let removed = self.clear_snapshots(owner)?;
        self.rows.extend(snapshots);
        Ok(removed)
    }
}
