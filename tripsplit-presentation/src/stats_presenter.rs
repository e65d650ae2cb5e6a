use std::{borrow::Cow, fmt::Write};

use rust_decimal::Decimal;
use tripsplit_application::MemberDirectory;
use tripsplit_domain::{ExpenseStats, Money};

use crate::{
    CurrencyFormat, member_label,
    text_table::{Alignment, TextTableBuilder},
};

const NO_BILLS: &str = "Add bills to see expense statistics";

pub struct StatsPresenter;

impl StatsPresenter {
    pub fn render(
        stats: &ExpenseStats,
        directory: &dyn MemberDirectory,
        currency: &CurrencyFormat,
    ) -> String {
        if stats.bill_count == 0 {
            return format!("{NO_BILLS}\n");
        }

        let mut out = String::with_capacity(512);
        let _ = writeln!(&mut out, "Total Spent: {}", currency.format(stats.total));
        let _ = writeln!(
            &mut out,
            "Average per Person: {}",
            currency.format(stats.average_per_person)
        );
        let _ = writeln!(&mut out, "Total Bills: {}", stats.bill_count);
        if let (Some(largest), Some(smallest)) = (stats.largest_bill, stats.smallest_bill) {
            let _ = writeln!(
                &mut out,
                "Largest Bill: {}  Smallest Bill: {}  Average Bill: {}",
                currency.format(largest),
                currency.format(smallest),
                currency.format(stats.average_bill)
            );
        }

        let mut categories: Vec<(&String, Money)> = stats
            .by_category
            .iter()
            .map(|(category, amount)| (category, *amount))
            .collect();
        sort_by_amount(&mut categories);

        let headers = [
            Cow::Borrowed("Category"),
            Cow::Borrowed("Amount"),
            Cow::Borrowed("Share"),
        ];
        let table = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right, Alignment::Right])
            .headers(&headers)
            .rows(categories.iter().map(|(category, amount)| {
                [
                    Cow::Borrowed(category.as_str()),
                    Cow::Owned(currency.format(*amount)),
                    Cow::Owned(percentage(*amount, stats.total)),
                ]
            }))
            .build();
        let _ = writeln!(&mut out);
        let _ = writeln!(&mut out, "Expenses by Category");
        out.push_str(&table);

        let mut spenders: Vec<(&str, Money)> = stats
            .by_member
            .iter()
            .map(|(id, amount)| (member_label(id, directory), *amount))
            .collect();
        sort_by_amount(&mut spenders);

        let _ = writeln!(&mut out);
        let _ = writeln!(&mut out, "Who Paid the Most");
        for (rank, (name, amount)) in spenders.iter().enumerate() {
            let _ = writeln!(&mut out, "  {}. {name}: {}", rank + 1, currency.format(*amount));
        }
        out
    }
}

/// Largest amount first; ties keep key order.
fn sort_by_amount<K>(entries: &mut [(K, Money)]) {
    entries.sort_by(|a, b| b.1.cmp(&a.1));
}

fn percentage(amount: Money, total: Money) -> String {
    if total.is_zero() {
        return "0.0%".to_owned();
    }
    let share = (amount.as_decimal() / total.as_decimal()) * Decimal::ONE_HUNDRED;
    format!("{:.1}%", share.round_dp(1))
}
