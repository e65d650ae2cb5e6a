use chrono::{DateTime, Utc};
use rstest::rstest;
use rust_decimal::Decimal;
use tripsplit_domain::{
    BalanceCalculator, Bill, BillId, Group, Member, MemberId, Money, SettlementLedger,
    SettlementPlanner,
};

fn group(members: &[&str], bills: &[(i64, &str, &[(&str, i64)])]) -> Group {
    let mut group = Group::new("g", "Scenario");
    group.members = members.iter().map(|id| Member::new(*id, id.to_uppercase())).collect();
    group.bills = bills
        .iter()
        .enumerate()
        .map(|(idx, (amount, paid_by, weights))| Bill {
            id: BillId::new(idx.to_string()),
            description: format!("bill {idx}"),
            amount: Money::from_i64(*amount),
            category: "Other".to_owned(),
            paid_by: MemberId::from(*paid_by),
            split_ratio: weights
                .iter()
                .map(|(member, weight)| (MemberId::from(*member), Decimal::from(*weight)))
                .collect(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        })
        .collect();
    group
}

#[rstest]
#[case::a_two_members_one_bill(
    group(&["a", "b"], &[(100, "a", &[("a", 1), ("b", 1)])]),
    &[("a", 50), ("b", -50)],
    &[("b", "a", 50)]
)]
#[case::b_three_way_equal(
    group(&["a", "b", "c"], &[(90, "a", &[("a", 1), ("b", 1), ("c", 1)])]),
    &[("a", 60), ("b", -30), ("c", -30)],
    &[("b", "a", 30), ("c", "a", 30)]
)]
#[case::c_custom_weights(
    group(&["a", "b"], &[(100, "a", &[("a", 1), ("b", 3)])]),
    &[("a", 75), ("b", -75)],
    &[("b", "a", 75)]
)]
#[case::d_zero_weight_excluded(
    group(&["a", "b", "c"], &[(60, "a", &[("a", 1), ("b", 1), ("c", 0)])]),
    &[("a", 30), ("b", -30), ("c", 0)],
    &[("b", "a", 30)]
)]
fn scenario(
    #[case] group: Group,
    #[case] expected_balances: &[(&str, i64)],
    #[case] expected_plan: &[(&str, &str, i64)],
) {
    let balances = BalanceCalculator::calculate(&group);
    for (member, amount) in expected_balances {
        assert_eq!(balances[&MemberId::from(*member)], Money::from_i64(*amount));
    }

    let plan = SettlementPlanner::plan(&balances);
    let actual: Vec<(&str, &str, Money)> = plan
        .iter()
        .map(|s| (s.from.as_str(), s.to.as_str(), s.amount))
        .collect();
    let expected: Vec<(&str, &str, Money)> = expected_plan
        .iter()
        .map(|(from, to, amount)| (*from, *to, Money::from_i64(*amount)))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn e_paid_settlement_leaves_other_pending() {
    let mut group = group(
        &["a", "b", "c"],
        &[(90, "a", &[("a", 1), ("b", 1), ("c", 1)])],
    );
    let balances = BalanceCalculator::calculate(&group);
    let plan = SettlementPlanner::plan(&balances);

    SettlementLedger::toggle(&plan, &mut group.paid_settlements, 0);

    let (pending, paid) = SettlementLedger::partition(&plan, &group.paid_settlements);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].settlement.from, MemberId::from("c"));
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].settlement.from, MemberId::from("b"));

    let applied =
        SettlementLedger::apply_paid_settlements(&balances, &plan, &group.paid_settlements);
    assert_eq!(applied[&MemberId::from("b")], Money::ZERO);
    assert_eq!(applied[&MemberId::from("c")], Money::from_i64(-30));
    assert_eq!(applied[&MemberId::from("a")], Money::from_i64(30));
}

#[test]
fn balance_conservation_across_many_bills() {
    let group = group(
        &["a", "b", "c", "d"],
        &[
            (100, "a", &[("a", 1), ("b", 1), ("c", 1)]),
            (77, "b", &[("b", 2), ("d", 5)]),
            (13, "d", &[("a", 1), ("b", 1), ("c", 1), ("d", 1)]),
        ],
    );

    let balances = BalanceCalculator::calculate(&group);

    let total: Money = balances.values().sum();
    assert!(total.is_within(Money::new(1, 9)));
}
