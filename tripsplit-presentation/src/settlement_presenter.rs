use std::{borrow::Cow, fmt::Write};

use chrono::{DateTime, Utc};
use tripsplit_application::{MemberDirectory, SettlementStatus, TallyReport};

use crate::{
    CurrencyFormat, member_label,
    text_table::{Alignment, TextTableBuilder},
};

const PAID: &str = "✓ PAID";
const PENDING: &str = "Pending";
const ALL_SETTLED: &str = "All settled up!";

pub struct SettlementPresenter;

impl SettlementPresenter {
    /// Plain-text settlement summary suitable for sharing or saving to a file.
    pub fn render_summary(
        group_name: &str,
        report: &TallyReport,
        directory: &dyn MemberDirectory,
        currency: &CurrencyFormat,
        generated_at: DateTime<Utc>,
    ) -> String {
        let mut out = String::with_capacity(512);
        let _ = writeln!(&mut out, "Settlement Summary for \"{group_name}\"");
        let _ = writeln!(
            &mut out,
            "Generated: {}",
            generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(&mut out);
        let _ = writeln!(
            &mut out,
            "Total Expenses: {}",
            currency.format(report.total_expenses)
        );
        let _ = writeln!(
            &mut out,
            "Number of Settlements: {}",
            report.settlements.len()
        );
        let _ = writeln!(&mut out);
        let _ = writeln!(&mut out, "SETTLEMENTS:");
        if report.settlements.is_empty() {
            let _ = writeln!(&mut out, "{ALL_SETTLED}");
        }
        for status in &report.settlements {
            let _ = writeln!(&mut out, "{}", settlement_line(status, directory, currency));
        }
        let _ = writeln!(&mut out);
        let _ = write!(
            &mut out,
            "Total to Settle: {}",
            currency.format(report.total_to_settle())
        );
        out
    }

    /// "Gets Back" and "Owes" lists from the effective balances.
    pub fn render_balances(
        report: &TallyReport,
        directory: &dyn MemberDirectory,
        currency: &CurrencyFormat,
    ) -> String {
        if report.is_balanced() {
            return format!("{ALL_SETTLED}\n");
        }

        let mut out = String::new();
        for (title, people) in [("Gets Back", report.creditors()), ("Owes", report.debtors())] {
            if people.is_empty() {
                continue;
            }
            let _ = writeln!(&mut out, "{title}:");
            for person in people {
                let _ = writeln!(
                    &mut out,
                    "  {}: {}",
                    member_label(&person.id, directory),
                    currency.format(person.balance.abs())
                );
            }
        }
        out
    }

    /// Numbered settlement table; the index column is what `toggle` expects.
    pub fn render_settlements(
        report: &TallyReport,
        directory: &dyn MemberDirectory,
        currency: &CurrencyFormat,
    ) -> String {
        if report.settlements.is_empty() {
            return format!("{ALL_SETTLED}\n");
        }

        let headers = [
            Cow::Borrowed("#"),
            Cow::Borrowed("From"),
            Cow::Borrowed("To"),
            Cow::Borrowed("Amount"),
            Cow::Borrowed("Status"),
        ];
        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Right,
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
                Alignment::Left,
            ])
            .headers(&headers);

        for status in &report.settlements {
            builder = builder.row([
                Cow::Owned(status.index.to_string()),
                Cow::Borrowed(member_label(&status.settlement.from, directory)),
                Cow::Borrowed(member_label(&status.settlement.to, directory)),
                Cow::Owned(currency.format(status.settlement.amount)),
                Cow::Borrowed(status_label(status.paid)),
            ]);
        }

        let mut table = builder.build();
        let _ = writeln!(
            &mut table,
            "Outstanding: {}",
            currency.format(report.outstanding())
        );
        table
    }
}

fn settlement_line(
    status: &SettlementStatus,
    directory: &dyn MemberDirectory,
    currency: &CurrencyFormat,
) -> String {
    format!(
        "{} → {}: {} ({})",
        member_label(&status.settlement.from, directory),
        member_label(&status.settlement.to, directory),
        currency.format(status.settlement.amount),
        status_label(status.paid)
    )
}

fn status_label(paid: bool) -> &'static str {
    if paid { PAID } else { PENDING }
}
