#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod group_session;
pub mod model;
pub mod ports;

pub use error::{SessionError, StoreError};
pub use group_session::{GroupSession, SaveOutcome};
pub use model::{PersonBalance, SettlementStatus, TallyReport};
pub use ports::{GroupStore, MemberDirectory};
