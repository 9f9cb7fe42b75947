pub mod accounts;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod loan;
pub mod simulation;
pub mod snapshot;
pub mod types;

// re-export key types
pub use accounts::{CredentialHasher, LogInForm, SignUpForm, User, UserRegistry};
pub use config::{CommitMode, EngineConfig};
pub use decimal::{Money, Rate};
pub use errors::{PayoffError, Result};
pub use events::{Event, EventStore};
pub use ledger::{delete_loan_cascade, LoanLedger, MemoryLedger, MemorySnapshotStore, SnapshotStore};
pub use loan::{Loan, LoanUpdate, NewLoan};
pub use simulation::{
    SimulationEngine, SimulationParams, SimulationReport, SimulationRequest, WorkingEntry, WorkingSet,
};
pub use snapshot::{Snapshot, SnapshotChart, SnapshotView};
pub use types::{LoanId, OwnerId, SnapshotId, Strategy};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
