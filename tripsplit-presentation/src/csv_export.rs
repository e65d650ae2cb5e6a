use std::fmt::Write;

use tripsplit_domain::Group;

use crate::{CurrencyFormat, member_label};

pub const CSV_HEADER: &str = "Group,Member,Bill Description,Amount,Category,Paid By,Date";

/// Exports bills as CSV, one row per bill.
///
/// `Member` lists the bill's split participants separated by `"; "`.
pub struct CsvExporter;

impl CsvExporter {
    pub fn export<'a>(groups: impl IntoIterator<Item = &'a Group>) -> String {
        let plain = CurrencyFormat::default();
        let mut csv = String::with_capacity(1024);
        let _ = writeln!(&mut csv, "{CSV_HEADER}");

        for group in groups {
            for bill in &group.bills {
                let participants = bill
                    .participants()
                    .map(|(id, _)| member_label(id, group))
                    .collect::<Vec<_>>()
                    .join("; ");
                let _ = writeln!(
                    &mut csv,
                    "{},{},{},{},{},{},{}",
                    quote(&group.name),
                    quote(&participants),
                    quote(&bill.description),
                    plain.format_plain(bill.amount),
                    quote(&bill.category),
                    quote(member_label(&bill.paid_by, group)),
                    quote(&bill.created_at.format("%Y-%m-%d").to_string()),
                );
            }
        }
        csv
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use tripsplit_domain::{Bill, BillId, Member, MemberId, Money, SplitRatio};

    fn group() -> Group {
        let mut group = Group::new("g", "Goa \"Monsoon\"");
        group.members = vec![Member::new("a", "Asha"), Member::new("b", "Bilal")];
        group.bills = vec![Bill {
            id: BillId::from("1"),
            description: "Dinner, beach shack".to_owned(),
            amount: Money::new(12345, 2),
            category: "Food & Dining".to_owned(),
            paid_by: MemberId::from("a"),
            split_ratio: SplitRatio::from([
                (MemberId::from("a"), Decimal::ONE),
                (MemberId::from("b"), Decimal::ONE),
                (MemberId::from("z"), Decimal::ZERO),
            ]),
            created_at: Utc.with_ymd_and_hms(2024, 7, 14, 19, 30, 0).unwrap(),
        }];
        group
    }

    #[test]
    fn exports_header_and_quoted_rows() {
        let csv = CsvExporter::export([&group()]);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "\"Goa \"\"Monsoon\"\"\",\"Asha; Bilal\",\"Dinner, beach shack\",123.45,\"Food & Dining\",\"Asha\",\"2024-07-14\""
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn empty_input_is_header_only() {
        assert_eq!(CsvExporter::export(Vec::<&Group>::new()), format!("{CSV_HEADER}\n"));
    }
}
