use tripsplit_domain::{MemberBalances, MemberId, Money, Settlement};

#[derive(Debug, Clone, PartialEq)]
pub struct PersonBalance {
    pub id: MemberId,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettlementStatus {
    pub index: usize,
    pub settlement: Settlement,
    pub paid: bool,
}

/// Everything a view needs to show who owes whom for one group snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TallyReport {
    pub total_expenses: Money,
    pub balances: Vec<PersonBalance>,
    /// Balances after applying the settlements marked as paid.
    pub effective_balances: Vec<PersonBalance>,
    pub settlements: Vec<SettlementStatus>,
}

impl TallyReport {
    pub fn pending(&self) -> impl Iterator<Item = &SettlementStatus> + '_ {
        self.settlements.iter().filter(|status| !status.paid)
    }

    pub fn paid(&self) -> impl Iterator<Item = &SettlementStatus> + '_ {
        self.settlements.iter().filter(|status| status.paid)
    }

    /// Members still owed money, largest first.
    pub fn creditors(&self) -> Vec<&PersonBalance> {
        self.select_effective(|balance| balance > Money::cent())
    }

    /// Members who still owe money, largest debt first.
    pub fn debtors(&self) -> Vec<&PersonBalance> {
        self.select_effective(|balance| balance < -Money::cent())
    }

    pub fn total_to_settle(&self) -> Money {
        self.settlements
            .iter()
            .map(|status| status.settlement.amount)
            .sum()
    }

    /// Sum of the settlements not yet marked paid.
    pub fn outstanding(&self) -> Money {
        self.pending().map(|status| status.settlement.amount).sum()
    }

    /// Every effective balance is within a cent of zero, paid settlements included.
    pub fn is_balanced(&self) -> bool {
        self.creditors().is_empty() && self.debtors().is_empty()
    }

    fn select_effective(&self, keep: impl Fn(Money) -> bool) -> Vec<&PersonBalance> {
        let mut selected: Vec<&PersonBalance> = self
            .effective_balances
            .iter()
            .filter(|person| keep(person.balance))
            .collect();
        selected.sort_by(|a, b| {
            b.balance
                .abs()
                .cmp(&a.balance.abs())
                .then_with(|| a.id.cmp(&b.id))
        });
        selected
    }
}

pub(crate) fn person_balances(balances: &MemberBalances) -> Vec<PersonBalance> {
    balances
        .iter()
        .map(|(id, balance)| PersonBalance {
            id: id.clone(),
            balance: *balance,
        })
        .collect()
}
