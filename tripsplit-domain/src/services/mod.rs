pub mod balance_calculator;
pub mod settlement_ledger;
pub mod settlement_planner;
pub mod stats_aggregator;

pub use balance_calculator::BalanceCalculator;
pub use settlement_ledger::{LedgerEntry, SettlementLedger};
pub use settlement_planner::SettlementPlanner;
pub use stats_aggregator::{ExpenseStats, StatsAggregator};
