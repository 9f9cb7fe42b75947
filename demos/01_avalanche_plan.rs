/// avalanche plan - form input, controlled time, and a failed run
use chrono::{TimeZone, Utc};
use debt_payoff_rs::{
    delete_loan_cascade, EngineConfig, LoanLedger, MemoryLedger, MemorySnapshotStore, Money, NewLoan,
    Rate, SafeTimeProvider, SimulationEngine, SimulationRequest, SnapshotStore, TimeSource,
};

fn request(payment: &str, frequency: &str, strategy: &str, duration: &str) -> SimulationRequest {
    SimulationRequest {
        payment: Some(payment.to_string()),
        frequency: Some(frequency.to_string()),
        strategy: Some(strategy.to_string()),
        duration: Some(duration.to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debt_payoff_rs=debug"))
        .init();

    println!("=== avalanche plan ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));

    let owner = 42;
    let mut ledger = MemoryLedger::new();
    let student = ledger.create_loan(owner, NewLoan::new("Student", Money::from_major(12_000), Rate::from_percentage(5)))?;
    ledger.create_loan(owner, NewLoan::new("Store card", Money::from_major(900), Rate::from_percentage(27)))?;
    ledger.create_loan(owner, NewLoan::new("Card", Money::from_major(3_200), Rate::from_percentage(19)))?;

    let mut store = MemorySnapshotStore::new();
    let mut engine = SimulationEngine::new(EngineConfig::standard())?;

    // twice a month, $250 each time, for two years
    let report = engine.run_request(owner, &request("250", "2", "avalanche", "24"), &ledger, &mut store, &time)?;
    println!("interest paid: ${}", report.interest_paid.round_cents());
    for (loan_id, balance) in &report.final_balances {
        println!("loan {}: ${}", loan_id, balance.round_cents());
    }
    for (label, points) in store.chart(owner)?.series() {
        let last = points.last().map(|(_, b)| *b).unwrap_or(Money::ZERO);
        println!("{:<12} {} points, last ${}", label, points.len(), last);
    }

    // reserved strategy
    if let Err(err) = engine.run_request(owner, &request("250", "2", "snowball", "24"), &ledger, &mut store, &time) {
        println!("\nsnowball: {}", err.user_message());
    }

    // payment below minimum interest
    if let Err(err) = engine.run_request(owner, &request("10", "1", "avalanche", "24"), &ledger, &mut store, &time) {
        println!("too small: {}", err.user_message());
    }

    // deleting a loan removes its snapshots first
    delete_loan_cascade(&mut ledger, &mut store, owner, student.id)?;
    println!("\nloans left: {}", ledger.loans_for_owner(owner)?.len());

    Ok(())
}
