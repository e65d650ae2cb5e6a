use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::{Group, MemberId, Money};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    pub total: Money,
    pub by_category: BTreeMap<String, Money>,
    /// Amount paid per member.
    pub by_member: BTreeMap<MemberId, Money>,
    pub average_per_person: Money,
    pub bill_count: usize,
    pub largest_bill: Option<Money>,
    pub smallest_bill: Option<Money>,
    pub average_bill: Money,
    pub top_category: Option<(String, Money)>,
    pub top_spender: Option<(MemberId, Money)>,
}

pub struct StatsAggregator;

impl StatsAggregator {
    pub fn aggregate(group: &Group) -> ExpenseStats {
        let mut stats = ExpenseStats {
            bill_count: group.bills.len(),
            ..ExpenseStats::default()
        };

        for bill in &group.bills {
            stats.total = stats.total.saturating_add(bill.amount);
            let category = stats
                .by_category
                .entry(bill.category.clone())
                .or_insert(Money::ZERO);
            *category = category.saturating_add(bill.amount);
            let paid = stats
                .by_member
                .entry(bill.paid_by.clone())
                .or_insert(Money::ZERO);
            *paid = paid.saturating_add(bill.amount);
            stats.largest_bill = Some(stats.largest_bill.map_or(bill.amount, |m| m.max(bill.amount)));
            stats.smallest_bill =
                Some(stats.smallest_bill.map_or(bill.amount, |m| m.min(bill.amount)));
        }

        stats.average_per_person = average(stats.total, group.members.len());
        stats.average_bill = average(stats.total, stats.bill_count);
        stats.top_category = largest_entry(&stats.by_category);
        stats.top_spender = largest_entry(&stats.by_member);
        stats
    }
}

fn average(total: Money, count: usize) -> Money {
    if count == 0 {
        return Money::ZERO;
    }
    Money::from_decimal(total.as_decimal() / Decimal::from(count))
}

/// Entry with the largest amount; the smallest key wins ties.
fn largest_entry<K: Clone + Ord>(map: &BTreeMap<K, Money>) -> Option<(K, Money)> {
    map.iter()
        .fold(None::<(&K, Money)>, |best, (key, amount)| match best {
            Some((_, best_amount)) if best_amount >= *amount => best,
            _ => Some((key, *amount)),
        })
        .map(|(key, amount)| (key.clone(), amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bill, BillId, Member, SplitRatio};
    use chrono::{DateTime, Utc};
    use rstest::rstest;

    fn bill(amount: i64, paid_by: &str, category: &str) -> Bill {
        Bill {
            id: BillId::new(format!("{paid_by}-{amount}")),
            description: category.to_owned(),
            amount: Money::from_i64(amount),
            category: category.to_owned(),
            paid_by: MemberId::from(paid_by),
            split_ratio: SplitRatio::from([(MemberId::from(paid_by), Decimal::ONE)]),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn aggregates_totals() {
        let mut group = Group::new("g", "Trip");
        group.members = vec![
            Member::new("a", "Asha"),
            Member::new("b", "Bilal"),
            Member::new("c", "Chen"),
            Member::new("d", "Dana"),
        ];
        group.bills = vec![
            bill(100, "a", "Food & Dining"),
            bill(40, "b", "Transportation"),
            bill(60, "a", "Food & Dining"),
        ];

        let stats = StatsAggregator::aggregate(&group);

        assert_eq!(stats.total, Money::from_i64(200));
        assert_eq!(stats.bill_count, 3);
        assert_eq!(stats.average_per_person, Money::from_i64(50));
        assert_eq!(stats.by_category["Food & Dining"], Money::from_i64(160));
        assert_eq!(stats.by_member[&MemberId::from("b")], Money::from_i64(40));
        assert_eq!(stats.largest_bill, Some(Money::from_i64(100)));
        assert_eq!(stats.smallest_bill, Some(Money::from_i64(40)));
        assert_eq!(stats.average_bill.round_cents(), Money::new(6667, 2));
        assert_eq!(
            stats.top_category,
            Some(("Food & Dining".to_owned(), Money::from_i64(160)))
        );
        assert_eq!(
            stats.top_spender,
            Some((MemberId::from("a"), Money::from_i64(160)))
        );
    }

    #[rstest]
    #[case::no_members_no_bills(vec![], vec![])]
    #[case::members_without_bills(vec![Member::new("a", "Asha")], vec![])]
    fn empty_group_yields_zero_stats(#[case] members: Vec<Member>, #[case] bills: Vec<Bill>) {
        let mut group = Group::new("g", "Empty");
        group.members = members;
        group.bills = bills;

        assert_eq!(StatsAggregator::aggregate(&group), ExpenseStats::default());
    }

    #[test]
    fn ties_prefer_smallest_key() {
        let mut group = Group::new("g", "Tie");
        group.bills = vec![bill(50, "b", "Fuel"), bill(50, "a", "Snacks")];

        let stats = StatsAggregator::aggregate(&group);

        assert_eq!(stats.top_spender.map(|(id, _)| id), Some(MemberId::from("a")));
        assert_eq!(
            stats.top_category.map(|(category, _)| category),
            Some("Fuel".to_owned())
        );
        assert_eq!(stats.average_per_person, Money::ZERO);
    }

    #[test]
    fn huge_totals_saturate() {
        let huge = Money::from_decimal(Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0));
        let mut group = Group::new("g", "Big");
        group.members = vec![Member::new("a", "Asha"), Member::new("b", "Bilal")];
        let mut first = bill(1, "a", "Other");
        first.amount = huge;
        let mut second = first.clone();
        second.id = BillId::from("second");
        group.bills = vec![first, second];

        let stats = StatsAggregator::aggregate(&group);

        assert_eq!(stats.total, Money::from_decimal(Decimal::MAX));
        assert_eq!(stats.by_member[&MemberId::from("a")], Money::from_decimal(Decimal::MAX));
        assert_eq!(stats.largest_bill, Some(huge));
        assert_eq!(stats.bill_count, 2);
    }
}
