use crate::model::{Bill, Group, MemberBalances, MemberId, Money, Weight};
use fxhash::{FxHashMap, FxHashSet};
use rust_decimal::Decimal;

/// Derives every member's net balance from the bills of a group.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Net balance per member, unrounded.
    ///
    /// Every current member gets an entry. A bill debits each participant its
    /// weighted share and credits the payer the full amount once, whether or not
    /// the payer takes part in the split. Bills with a non-positive amount or
    /// weight total are skipped, as are references to members no longer in the
    /// group: an unknown payer drops the whole bill, unknown participants are
    /// left out of the weight total.
    pub fn calculate(group: &Group) -> MemberBalances {
        let known: FxHashSet<&MemberId> = group.members.iter().map(|member| &member.id).collect();
        let mut balances: MemberBalances = group
            .members
            .iter()
            .map(|member| (member.id.clone(), Money::ZERO))
            .collect();

        for bill in &group.bills {
            Self::apply_bill(&mut balances, &known, bill);
        }

        balances
    }

    fn apply_bill(balances: &mut MemberBalances, known: &FxHashSet<&MemberId>, bill: &Bill) {
        if !bill.amount.is_positive() {
            tracing::debug!(bill = %bill.id, amount = %bill.amount, "skipping bill with non-positive amount");
            return;
        }
        if !known.contains(&bill.paid_by) {
            tracing::warn!(bill = %bill.id, payer = %bill.paid_by, "skipping bill paid by unknown member");
            return;
        }

        let participants: Vec<(&MemberId, Weight)> = bill
            .participants()
            .filter(|(member, weight)| {
                let keep = known.contains(member);
                if !keep {
                    tracing::warn!(bill = %bill.id, member = %member, %weight, "ignoring unknown split member");
                }
                keep
            })
            .collect();
        let total_weight: Weight = participants.iter().map(|(_, weight)| *weight).sum();
        if total_weight <= Decimal::ZERO {
            tracing::debug!(bill = %bill.id, "skipping bill with degenerate split");
            return;
        }

        let amount = bill.amount.as_decimal();
        let shares: Option<Vec<(&MemberId, Money)>> = participants
            .into_iter()
            .map(|(member, weight)| {
                amount
                    .checked_mul(weight)
                    .and_then(|scaled| scaled.checked_div(total_weight))
                    .map(|share| (member, Money::from_decimal(share)))
            })
            .collect();
        let Some(updated) = shares.and_then(|shares| Self::stage(balances, &shares, bill)) else {
            tracing::error!(bill = %bill.id, "balance arithmetic overflowed; bill ignored");
            return;
        };

        for (member, value) in updated {
            if let Some(balance) = balances.get_mut(member) {
                *balance = value;
            }
        }
    }

    /// New balances of every member the bill touches, or `None` on overflow.
    fn stage<'b>(
        balances: &MemberBalances,
        shares: &[(&'b MemberId, Money)],
        bill: &'b Bill,
    ) -> Option<FxHashMap<&'b MemberId, Money>> {
        let mut staged: FxHashMap<&MemberId, Money> = FxHashMap::default();
        let current = |staged: &FxHashMap<&MemberId, Money>, member: &MemberId| {
            staged
                .get(member)
                .or_else(|| balances.get(member))
                .copied()
                .unwrap_or(Money::ZERO)
        };

        for &(member, share) in shares {
            let value = current(&staged, member).checked_sub(share)?;
            staged.insert(member, value);
        }
        let value = current(&staged, &bill.paid_by).checked_add(bill.amount)?;
        staged.insert(&bill.paid_by, value);
        Some(staged)
    }
}
