use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info, warn};

use crate::config::{CommitMode, EngineConfig};
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::ledger::{LoanLedger, SnapshotStore};
use crate::types::OwnerId;

use super::accrual::AccrualStep;
use super::recorder::SnapshotRecorder;
use super::strategy::Redistributor;
use super::working_set::WorkingSet;
use super::{SimulationParams, SimulationReport, SimulationRequest};

/// runs payoff projections over an owner's loans
pub struct SimulationEngine {
    pub config: EngineConfig,
    pub events: EventStore,
}

impl SimulationEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            events: EventStore::new(),
        })
    }

    /// parse raw form fields, then run
    pub fn run_request<L, S>(
        &mut self,
        owner: OwnerId,
        request: &SimulationRequest,
        ledger: &L,
        store: &mut S,
        time_provider: &SafeTimeProvider,
    ) -> Result<SimulationReport>
    where
        L: LoanLedger + ?Sized,
        S: SnapshotStore + ?Sized,
    {
        let params = request.parse(owner)?;
        self.run(&params, ledger, store, time_provider)
    }

    /// project the owner's loans month by month and persist snapshots.
    ///
    /// Parameters and strategy are checked before anything is written. In
    /// `PerMonth` mode an abort keeps the months that already finished; in
    /// `Atomic` mode the store is only touched once every month has run, and
    /// a failed write leaves the earlier snapshots in place.
    ///
    /// `events` holds the events of the latest run only.
    pub fn run<L, S>(
        &mut self,
        params: &SimulationParams,
        ledger: &L,
        store: &mut S,
        time_provider: &SafeTimeProvider,
    ) -> Result<SimulationReport>
    where
        L: LoanLedger + ?Sized,
        S: SnapshotStore + ?Sized,
    {
        self.events.clear();
        params.validate(&self.config)?;
        let redistributor = Redistributor::new(params.strategy)?;
        let owner = params.owner;

        let loans = ledger.loans_for_owner(owner)?;
        if loans.is_empty() {
            info!(owner, "no loans to simulate");
            return Ok(SimulationReport::empty(owner, params.strategy));
        }

        let mut set = WorkingSet::build(owner, &loans)?;
        let start_date = self
            .config
            .start_date
            .unwrap_or_else(|| time_provider.now().date_naive());
        let mut recorder = SnapshotRecorder::new(owner, start_date, self.config.snapshot_dp);
        let accrual = AccrualStep::new(params.frequency);

        info!(
            owner,
            strategy = %params.strategy,
            payment = %params.payment,
            frequency = params.frequency,
            months = params.duration_months,
            loans = set.len(),
            "simulation started"
        );
        self.events.emit(Event::SimulationStarted {
            owner,
            strategy: params.strategy,
            payment: params.payment,
            frequency: params.frequency,
            duration_months: params.duration_months,
            loan_count: set.len(),
        });

        let mut report = SimulationReport::empty(owner, params.strategy);
        report.start_date = Some(start_date);
        report.final_balances = set.balances();

        if let Err(err) = self.run_months(params, &accrual, &redistributor, &mut set, &mut recorder, &mut report, store) {
            let month = report.months_run;
            let dropped = recorder.discard_pending();
            warn!(owner, month, dropped, error = %err, "simulation aborted");
            self.events.emit(Event::SimulationAborted {
                owner,
                month,
                reason: err.to_string(),
            });
            return Err(err);
        }

        report.final_balances = set.balances();
        info!(
            owner,
            months = report.months_run,
            remaining = %report.remaining_balance(),
            paid_off = report.payoff_dates.len(),
            "simulation completed"
        );
        self.events.emit(Event::SimulationCompleted {
            owner,
            months_run: report.months_run,
            remaining_balance: report.remaining_balance(),
        });

        Ok(report)
    }

    /// every month of the run plus the commits the mode calls for
    #[allow(clippy::too_many_arguments)]
    fn run_months<S: SnapshotStore + ?Sized>(
        &mut self,
        params: &SimulationParams,
        accrual: &AccrualStep,
        redistributor: &Redistributor,
        set: &mut WorkingSet,
        recorder: &mut SnapshotRecorder,
        report: &mut SimulationReport,
        store: &mut S,
    ) -> Result<()> {
        let owner = params.owner;
        if self.config.commit_mode == CommitMode::PerMonth {
            let removed = recorder.clear_prior(store)?;
            self.events.emit(Event::PriorSnapshotsCleared { owner, removed });
        }

        for month in 0..params.duration_months {
            let (date, recorded) = recorder.record_month(month, set)?;
            self.events.emit(Event::MonthRecorded {
                month,
                date,
                snapshot_count: recorded,
            });

            self.run_month(month, params, accrual, redistributor, set, report, date)?;

            let charged = accrual.charge_month_interest(set);
            report.interest_charged += charged;
            self.events.emit(Event::InterestCharged { month, amount: charged });

            if self.config.commit_mode == CommitMode::PerMonth {
                report.snapshots_recorded += recorder.commit(store)?;
            }
            report.months_run = month + 1;
            debug!(owner, month, %date, remaining = %set.total_balance(), "month simulated");
        }

        if self.config.commit_mode == CommitMode::Atomic {
            let (removed, written) = recorder.commit_replacing(store)?;
            self.events.emit(Event::PriorSnapshotsCleared { owner, removed });
            report.snapshots_recorded += written;
        }
        Ok(())
    }

    /// sub-period payments and redistribution for one month
    #[allow(clippy::too_many_arguments)]
    fn run_month(
        &mut self,
        month: u32,
        params: &SimulationParams,
        accrual: &AccrualStep,
        redistributor: &Redistributor,
        set: &mut WorkingSet,
        report: &mut SimulationReport,
        date: chrono::NaiveDate,
    ) -> Result<()> {
        for period in 1..=accrual.frequency() {
            let outcome = accrual.pay_minimum(set, params.payment, month, period)?;
            report.interest_paid += outcome.interest_paid;
            self.events.emit(Event::MinimumInterestPaid {
                month,
                period,
                amount: outcome.interest_paid,
                leftover: outcome.leftover,
            });

            let redistribution = redistributor.apply(set, outcome.leftover)?;
            for (loan_id, amount) in &redistribution.applied {
                self.events.emit(Event::SurplusApplied {
                    month,
                    loan_id: *loan_id,
                    amount: *amount,
                });
            }
        }

        // loans that reached zero during this month
        for (loan_id, entry) in set.iter() {
            if entry.is_active() || report.payoff_dates.contains_key(&loan_id) {
                continue;
            }
            // skip loans that were already at zero before the month
            let was_owing = report
                .final_balances
                .get(&loan_id)
                .is_some_and(|b| b.is_positive());
            if !was_owing {
                continue;
            }
            info!(loan_id, label = %entry.label, %date, "loan paid off");
            report.payoff_dates.insert(loan_id, date);
            self.events.emit(Event::LoanPaidOff {
                month,
                loan_id,
                label: entry.label.clone(),
            });
        }
        report.final_balances = set.balances();
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            events: EventStore::new(),
        }
    }
}
