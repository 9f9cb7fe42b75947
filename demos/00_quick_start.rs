/// quick start - project two loans for a year with the avalanche strategy
use debt_payoff_rs::{
    LoanLedger, MemoryLedger, MemorySnapshotStore, Money, NewLoan, Rate, SafeTimeProvider,
    SimulationEngine, SimulationParams, SnapshotStore, Strategy, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let owner = 1;
    let mut ledger = MemoryLedger::new();
    ledger.create_loan(owner, NewLoan::new("Car", Money::from_major(8_000), Rate::from_percentage(6)))?;
    ledger.create_loan(owner, NewLoan::new("Card", Money::from_major(2_500), Rate::from_percentage(22)))?;

    let mut store = MemorySnapshotStore::new();
    let mut engine = SimulationEngine::default();
    let time = SafeTimeProvider::new(TimeSource::System);

    // $400 a month, paid once a month, for 12 months
    let params = SimulationParams::new(owner, Money::from_major(400), 1, Strategy::Avalanche, 12);
    let report = engine.run(&params, &ledger, &mut store, &time)?;

    println!("months simulated: {}", report.months_run);
    println!("remaining debt: ${}", report.remaining_balance().round_cents());
    for (loan_id, date) in &report.payoff_dates {
        println!("loan {} paid off in {}", loan_id, date.format("%B %Y"));
    }
    println!("{}", store.chart(owner)?.to_json()?);

    Ok(())
}
