use std::collections::BTreeSet;

use crate::{
    model::{Group, MemberBalances, Money, PaidSettlements, Settlement},
    services::{BalanceCalculator, SettlementPlanner},
};

/// A settlement of the current plan together with its position and paid flag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LedgerEntry<'a> {
    pub index: usize,
    pub settlement: &'a Settlement,
    pub paid: bool,
}

/// Tracks which planned settlements have actually been transacted.
pub struct SettlementLedger;

impl SettlementLedger {
    /// Flips the paid flag of `plan[index]`.
    ///
    /// Returns the new flag, or `None` when `index` is outside the plan.
    pub fn toggle(plan: &[Settlement], paid: &mut PaidSettlements, index: usize) -> Option<bool> {
        let settlement = plan.get(index)?;
        let now_paid = paid.toggle(settlement);
        tracing::debug!(
            index,
            from = %settlement.from,
            to = %settlement.to,
            amount = %settlement.amount,
            paid = now_paid,
            "toggled settlement"
        );
        Some(now_paid)
    }

    pub fn entries<'a>(plan: &'a [Settlement], paid: &PaidSettlements) -> Vec<LedgerEntry<'a>> {
        plan.iter()
            .enumerate()
            .map(|(index, settlement)| LedgerEntry {
                index,
                settlement,
                paid: paid.is_paid(settlement),
            })
            .collect()
    }

    /// Splits the plan into `(pending, paid)`, keeping plan positions.
    pub fn partition<'a>(
        plan: &'a [Settlement],
        paid: &PaidSettlements,
    ) -> (Vec<LedgerEntry<'a>>, Vec<LedgerEntry<'a>>) {
        Self::entries(plan, paid)
            .into_iter()
            .partition(|entry| !entry.paid)
    }

    /// Balances as if every paid settlement had been transferred.
    pub fn apply_paid_settlements(
        balances: &MemberBalances,
        settlements: &[Settlement],
        paid: &PaidSettlements,
    ) -> MemberBalances {
        Self::apply(
            balances,
            settlements.iter().filter(|settlement| paid.is_paid(settlement)),
        )
    }

    /// Index-keyed variant of [`Self::apply_paid_settlements`] for callers that
    /// track positions within `settlements`; unknown indices are ignored.
    pub fn apply_paid_indices(
        balances: &MemberBalances,
        settlements: &[Settlement],
        paid_indices: &BTreeSet<usize>,
    ) -> MemberBalances {
        Self::apply(
            balances,
            paid_indices.iter().filter_map(|&index| settlements.get(index)),
        )
    }

    /// Recomputes balances and plan for `group` and applies its paid settlements.
    pub fn effective_balances(group: &Group) -> MemberBalances {
        let balances = BalanceCalculator::calculate(group);
        let plan = SettlementPlanner::plan(&balances);
        Self::apply_paid_settlements(&balances, &plan, &group.paid_settlements)
    }

    fn apply<'a, I>(balances: &MemberBalances, paid: I) -> MemberBalances
    where
        I: IntoIterator<Item = &'a Settlement>,
    {
        let mut adjusted = balances.clone();
        for settlement in paid {
            *adjusted.entry(settlement.from.clone()).or_insert(Money::ZERO) += settlement.amount;
            *adjusted.entry(settlement.to.clone()).or_insert(Money::ZERO) -= settlement.amount;
        }
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bill, BillId, Member, MemberId};
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};
    use rust_decimal::Decimal;

    #[fixture]
    fn group() -> Group {
        let mut group = Group::new("g", "Weekend");
        group.members = vec![
            Member::new("a", "Asha"),
            Member::new("b", "Bilal"),
            Member::new("c", "Chen"),
        ];
        group.bills = vec![Bill {
            id: BillId::from("1"),
            description: "Cabin".to_owned(),
            amount: Money::from_i64(90),
            category: "Accommodation".to_owned(),
            paid_by: MemberId::from("a"),
            split_ratio: ["a", "b", "c"]
                .into_iter()
                .map(|id| (MemberId::from(id), Decimal::ONE))
                .collect(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }];
        group
    }

    fn balance(balances: &MemberBalances, id: &str) -> Money {
        balances[&MemberId::from(id)]
    }

    #[rstest]
    fn marking_one_of_two_paid(mut group: Group) {
        let balances = BalanceCalculator::calculate(&group);
        let plan = SettlementPlanner::plan(&balances);
        assert_eq!(plan.len(), 2);

        assert_eq!(
            SettlementLedger::toggle(&plan, &mut group.paid_settlements, 0),
            Some(true)
        );

        let (pending, paid) = SettlementLedger::partition(&plan, &group.paid_settlements);
        assert_eq!(pending.iter().map(|e| e.index).collect::<Vec<_>>(), vec![1]);
        assert_eq!(paid.iter().map(|e| e.index).collect::<Vec<_>>(), vec![0]);

        let effective = SettlementLedger::effective_balances(&group);
        assert_eq!(balance(&effective, "a"), Money::from_i64(30));
        assert_eq!(balance(&effective, "b"), Money::ZERO);
        assert_eq!(balance(&effective, "c"), Money::from_i64(-30));
    }

    #[rstest]
    fn toggling_twice_restores_pending(mut group: Group) {
        let plan = SettlementPlanner::plan(&BalanceCalculator::calculate(&group));

        SettlementLedger::toggle(&plan, &mut group.paid_settlements, 1);
        assert_eq!(
            SettlementLedger::toggle(&plan, &mut group.paid_settlements, 1),
            Some(false)
        );
        assert!(group.paid_settlements.is_empty());
    }

    #[rstest]
    fn toggling_outside_plan_is_rejected(mut group: Group) {
        let plan = SettlementPlanner::plan(&BalanceCalculator::calculate(&group));
        assert_eq!(
            SettlementLedger::toggle(&plan, &mut group.paid_settlements, 2),
            None
        );
    }

    #[rstest]
    fn index_and_key_application_agree(group: Group) {
        let balances = BalanceCalculator::calculate(&group);
        let plan = SettlementPlanner::plan(&balances);
        let indices = BTreeSet::from([1]);
        let paid = PaidSettlements::from_indices(&plan, indices.iter().copied());

        assert_eq!(
            SettlementLedger::apply_paid_indices(&balances, &plan, &indices),
            SettlementLedger::apply_paid_settlements(&balances, &plan, &paid)
        );
    }

    #[rstest]
    fn paying_everything_settles_all(group: Group) {
        let balances = BalanceCalculator::calculate(&group);
        let plan = SettlementPlanner::plan(&balances);
        let all: BTreeSet<usize> = (0..plan.len()).collect();

        let settled = SettlementLedger::apply_paid_indices(&balances, &plan, &all);

        assert!(settled.values().all(|b| b.is_within(Money::cent())));
        assert!(SettlementPlanner::plan(&settled).is_empty());
    }

    #[rstest]
    fn stale_key_does_not_apply_after_plan_changes(mut group: Group) {
        let plan = SettlementPlanner::plan(&BalanceCalculator::calculate(&group));
        SettlementLedger::toggle(&plan, &mut group.paid_settlements, 0);

        group.bills[0].amount = Money::from_i64(120);

        let balances = BalanceCalculator::calculate(&group);
        assert_eq!(SettlementLedger::effective_balances(&group), balances);
    }
}
