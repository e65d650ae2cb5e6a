use crate::model::{MemberBalances, MemberId, Money, Settlement};

/// Greedy minimum-transaction settlement planning.
pub struct SettlementPlanner;

struct Position<'a> {
    member: &'a MemberId,
    remaining: Money,
}

impl SettlementPlanner {
    /// Plans settling payments for `balances`.
    ///
    /// Balances within one cent of zero count as settled. Creditors and debtors
    /// are each sorted by descending amount (ties by member id) and the largest
    /// debtor always pays the largest creditor, so at most `n - 1` payments are
    /// emitted for `n` unsettled members. All amounts are rounded to cents.
    pub fn plan(balances: &MemberBalances) -> Vec<Settlement> {
        let tolerance = Money::cent();
        let mut creditors = Vec::new();
        let mut debtors = Vec::new();

        for (member, balance) in balances {
            if *balance > tolerance {
                creditors.push(Position {
                    member,
                    remaining: balance.round_cents(),
                });
            } else if *balance < -tolerance {
                debtors.push(Position {
                    member,
                    remaining: balance.abs().round_cents(),
                });
            }
        }

        sort_descending(&mut creditors);
        sort_descending(&mut debtors);

        let mut settlements = Vec::with_capacity(creditors.len().max(debtors.len()));
        let (mut creditor_idx, mut debtor_idx) = (0, 0);

        while let (Some(creditor), Some(debtor)) =
            (creditors.get_mut(creditor_idx), debtors.get_mut(debtor_idx))
        {
            let amount = creditor.remaining.min(debtor.remaining).round_cents();
            if amount.is_positive() {
                settlements.push(Settlement {
                    from: debtor.member.clone(),
                    to: creditor.member.clone(),
                    amount,
                });
            }

            creditor.remaining = (creditor.remaining - amount).round_cents();
            debtor.remaining = (debtor.remaining - amount).round_cents();

            let creditor_done = creditor.remaining <= tolerance;
            let debtor_done = debtor.remaining <= tolerance;
            if !creditor_done && !debtor_done {
                break;
            }
            if creditor_done {
                creditor_idx += 1;
            }
            if debtor_done {
                debtor_idx += 1;
            }
        }

        tracing::debug!(
            creditors = creditors.len(),
            debtors = debtors.len(),
            settlements = settlements.len(),
            "planned settlements"
        );

        settlements
    }
}

fn sort_descending(positions: &mut [Position<'_>]) {
    positions.sort_by(|a, b| {
        b.remaining
            .cmp(&a.remaining)
            .then_with(|| a.member.cmp(b.member))
    });
}
