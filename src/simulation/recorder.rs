use chrono::{Months, NaiveDate};

use crate::errors::{PayoffError, Result};
use crate::ledger::SnapshotStore;
use crate::snapshot::Snapshot;
use crate::types::OwnerId;

use super::working_set::WorkingSet;

/// buffers per-month snapshot rows and writes them to a store
#[derive(Debug)]
pub struct SnapshotRecorder {
    owner: OwnerId,
    start_date: NaiveDate,
    balance_dp: u32,
    pending: Vec<Snapshot>,
}

impl SnapshotRecorder {
    pub fn new(owner: OwnerId, start_date: NaiveDate, balance_dp: u32) -> Self {
        Self {
            owner,
            start_date,
            balance_dp,
            pending: Vec::new(),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// snapshot date of a zero-based simulated month
    pub fn date_for(&self, month: u32) -> Result<NaiveDate> {
        self.start_date
            .checked_add_months(Months::new(month))
            .ok_or_else(|| PayoffError::validation("duration", "runs past the last representable date"))
    }

    /// buffer one row per loan for `month`
    pub fn record_month(&mut self, month: u32, set: &WorkingSet) -> Result<(NaiveDate, usize)> {
        let date = self.date_for(month)?;
        let before = self.pending.len();
        for (loan_id, entry) in set.iter() {
            self.pending.push(Snapshot::capture(
                self.owner,
                loan_id,
                date,
                entry.balance().round_dp(self.balance_dp),
                &entry.label,
            ));
        }
        Ok((date, self.pending.len() - before))
    }

    pub fn pending(&self) -> &[Snapshot] {
        &self.pending
    }

    /// drop rows that were buffered but not committed
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// remove every earlier snapshot of the owner
    pub fn clear_prior<S: SnapshotStore + ?Sized>(&self, store: &mut S) -> Result<usize> {
        store.clear_snapshots(self.owner)
    }

    /// write buffered rows, returns rows written
    pub fn commit<S: SnapshotStore + ?Sized>(&mut self, store: &mut S) -> Result<usize> {
        let rows = std::mem::take(&mut self.pending);
        let written = rows.len();
        store.insert_snapshots(rows)?;
        Ok(written)
    }

    /// swap the owner's earlier snapshots for the buffered rows in one store
    /// call, returns (rows removed, rows written)
    pub fn commit_replacing<S: SnapshotStore + ?Sized>(&mut self, store: &mut S) -> Result<(usize, usize)> {
        let rows = std::mem::take(&mut self.pending);
        let written = rows.len();
        let removed = store.replace_snapshots(self.owner, rows)?;
        Ok((removed, written))
    }
}
