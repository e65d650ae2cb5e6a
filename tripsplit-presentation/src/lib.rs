#![warn(clippy::uninlined_format_args)]

pub mod csv_export;
pub mod currency;
pub mod settlement_presenter;
pub mod stats_presenter;
pub mod text_table;

pub use csv_export::CsvExporter;
pub use currency::CurrencyFormat;
pub use settlement_presenter::SettlementPresenter;
pub use stats_presenter::StatsPresenter;
pub use text_table::{Alignment, TextTableBuilder};

const UNKNOWN_MEMBER: &str = "Unknown";

fn member_label<'a>(
    member_id: &tripsplit_domain::MemberId,
    directory: &'a dyn tripsplit_application::MemberDirectory,
) -> &'a str {
    directory.display_name(member_id).unwrap_or(UNKNOWN_MEMBER)
}
