#![warn(clippy::uninlined_format_args)]

pub mod draft;
pub mod error;
pub mod model;
pub mod services;

pub use draft::{BillDraft, SplitMode};
pub use error::{BillValidationError, GroupEditError};
pub use model::{
    Bill, BillId, Group, Member, MemberBalances, MemberId, Money, PaidSettlements, Settlement,
    SettlementKey, SplitRatio, Weight,
};
pub use services::{
    BalanceCalculator, ExpenseStats, LedgerEntry, SettlementLedger, SettlementPlanner,
    StatsAggregator,
};
