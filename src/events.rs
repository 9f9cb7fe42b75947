use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, OwnerId, Strategy};

/// events emitted during a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // run lifecycle
    SimulationStarted {
        owner: OwnerId,
        strategy: Strategy,
        payment: Money,
        frequency: u32,
        duration_months: u32,
        loan_count: usize,
    },
    PriorSnapshotsCleared {
        owner: OwnerId,
        removed: usize,
    },
    SimulationCompleted {
        owner: OwnerId,
        months_run: u32,
        remaining_balance: Money,
    },
    SimulationAborted {
        owner: OwnerId,
        month: u32,
        reason: String,
    },

    // per month
    MonthRecorded {
        month: u32,
        date: NaiveDate,
        snapshot_count: usize,
    },
    MinimumInterestPaid {
        month: u32,
        period: u32,
        amount: Money,
        leftover: Money,
    },
    SurplusApplied {
        month: u32,
        loan_id: LoanId,
        amount: Money,
    },
    LoanPaidOff {
        month: u32,
        loan_id: LoanId,
        label: String,
    },
    InterestCharged {
        month: u32,
        amount: Money,
    },
}

/// event store for collecting events during a run
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
