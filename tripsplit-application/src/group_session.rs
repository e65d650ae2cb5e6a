use chrono::Utc;
use tripsplit_domain::{
    BalanceCalculator, Bill, BillDraft, BillId, ExpenseStats, Group, GroupEditError, Member,
    MemberBalances, MemberId, Settlement, SettlementLedger, SettlementPlanner, StatsAggregator,
};

use crate::{
    error::SessionError,
    model::{SettlementStatus, TallyReport, person_balances},
    ports::GroupStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// The snapshot matched the last one written, so the store was not called.
    Unchanged,
}

/// Use-case service over one group snapshot and its persistence collaborator.
///
/// Every mutation is applied in memory first and then written through the
/// store. A failed write is reported to the caller but never rolled back.
pub struct GroupSession<'a> {
    group: Group,
    store: &'a dyn GroupStore,
    last_saved: Option<String>,
}

impl<'a> GroupSession<'a> {
    pub fn new(group: Group, store: &'a dyn GroupStore) -> Self {
        let mut session = Self {
            group,
            store,
            last_saved: None,
        };
        session.migrate_legacy_indices();
        session
    }

    /// Loads the stored snapshot, or starts an empty group when none exists.
    pub fn open(store: &'a dyn GroupStore) -> Result<Self, SessionError> {
        let Some(raw) = store.load()? else {
            tracing::info!("no stored group found; starting empty");
            return Ok(Self::new(Group::default(), store));
        };

        let group: Group = serde_json::from_str(&raw).map_err(SessionError::Corrupt)?;
        let canonical = serde_json::to_string(&group).map_err(SessionError::Encode)?;
        let mut session = Self {
            group,
            store,
            last_saved: Some(canonical),
        };
        session.migrate_legacy_indices();
        Ok(session)
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn into_group(self) -> Group {
        self.group
    }

    pub fn balances(&self) -> MemberBalances {
        BalanceCalculator::calculate(&self.group)
    }

    pub fn plan(&self) -> Vec<Settlement> {
        SettlementPlanner::plan(&self.balances())
    }

    pub fn effective_balances(&self) -> MemberBalances {
        SettlementLedger::effective_balances(&self.group)
    }

    pub fn stats(&self) -> ExpenseStats {
        StatsAggregator::aggregate(&self.group)
    }

    pub fn report(&self) -> TallyReport {
        let balances = self.balances();
        let plan = SettlementPlanner::plan(&balances);
        let effective =
            SettlementLedger::apply_paid_settlements(&balances, &plan, &self.group.paid_settlements);
        let settlements = SettlementLedger::entries(&plan, &self.group.paid_settlements)
            .into_iter()
            .map(|entry| SettlementStatus {
                index: entry.index,
                settlement: entry.settlement.clone(),
                paid: entry.paid,
            })
            .collect();

        TallyReport {
            total_expenses: self.group.bills.iter().map(|bill| bill.amount).sum(),
            balances: person_balances(&balances),
            effective_balances: person_balances(&effective),
            settlements,
        }
    }

    /// Flips the paid flag of settlement `index` in the current plan and persists it.
    pub fn toggle_settlement(&mut self, index: usize) -> Result<bool, SessionError> {
        let plan = self.plan();
        let paid = SettlementLedger::toggle(&plan, &mut self.group.paid_settlements, index)
            .ok_or(SessionError::SettlementOutOfRange {
                index,
                len: plan.len(),
            })?;
        self.save()?;
        Ok(paid)
    }

    pub fn add_member(&mut self, name: &str) -> Result<MemberId, SessionError> {
        let id = MemberId::new(self.next_id(|group, id| group.has_member(&MemberId::new(id))));
        self.group.add_member(Member::new(id.clone(), name.trim()))?;
        tracing::info!(member = %id, name, "added member");
        self.after_edit()?;
        Ok(id)
    }

    /// Removes a member and every bill that mentions them.
    pub fn remove_member(&mut self, id: &MemberId) -> Result<Vec<Bill>, SessionError> {
        let removed = self.group.remove_member(id)?;
        tracing::info!(member = %id, removed_bills = removed.len(), "removed member");
        self.after_edit()?;
        Ok(removed)
    }

    pub fn add_bill(&mut self, draft: BillDraft) -> Result<BillId, SessionError> {
        let id = BillId::new(self.next_id(|group, id| group.bill(&BillId::new(id)).is_some()));
        let bill = draft.validate(&self.group, id.clone(), Utc::now())?;
        tracing::info!(bill = %id, amount = %bill.amount, "added bill");
        self.group.upsert_bill(bill);
        self.after_edit()?;
        Ok(id)
    }

    /// Replaces an existing bill, keeping its id and creation time.
    pub fn update_bill(&mut self, id: &BillId, draft: BillDraft) -> Result<(), SessionError> {
        let created_at = self
            .group
            .bill(id)
            .map(|bill| bill.created_at)
            .ok_or_else(|| GroupEditError::UnknownBill(id.clone()))?;
        let bill = draft.validate(&self.group, id.clone(), created_at)?;
        self.group.upsert_bill(bill);
        tracing::info!(bill = %id, "updated bill");
        self.after_edit()
    }

    pub fn delete_bill(&mut self, id: &BillId) -> Result<Bill, SessionError> {
        let removed = self.group.remove_bill(id)?;
        tracing::info!(bill = %id, "deleted bill");
        self.after_edit()?;
        Ok(removed)
    }

    /// `true` when the in-memory group differs from the last snapshot written.
    pub fn is_dirty(&self) -> bool {
        match serde_json::to_string(&self.group) {
            Ok(snapshot) => self.last_saved.as_deref() != Some(snapshot.as_str()),
            Err(_) => true,
        }
    }

    /// Writes the group unless it is identical to the last snapshot written.
    pub fn save(&mut self) -> Result<SaveOutcome, SessionError> {
        let snapshot = serde_json::to_string(&self.group).map_err(SessionError::Encode)?;
        if self.last_saved.as_deref() == Some(snapshot.as_str()) {
            tracing::debug!("group unchanged since last save; skipping write");
            return Ok(SaveOutcome::Unchanged);
        }

        if let Err(err) = self.store.save(&snapshot) {
            tracing::warn!(error = %err, "failed to persist group; keeping in-memory state");
            return Err(err.into());
        }
        self.last_saved = Some(snapshot);
        Ok(SaveOutcome::Written)
    }

    fn after_edit(&mut self) -> Result<(), SessionError> {
        let plan = self.plan();
        let dropped = self.group.paid_settlements.retain_current(&plan);
        if dropped > 0 {
            tracing::info!(dropped, "cleared paid marks invalidated by the edit");
        }
        self.save().map(|_| ())
    }

    fn migrate_legacy_indices(&mut self) {
        if self.group.paid_settlement_indices.is_empty() {
            return;
        }
        let indices = std::mem::take(&mut self.group.paid_settlement_indices);
        let plan = self.plan();
        let mut migrated = 0;
        for settlement in indices.iter().filter_map(|&index| plan.get(index)) {
            self.group.paid_settlements.mark_paid(settlement);
            migrated += 1;
        }
        tracing::info!(
            indices = indices.len(),
            migrated,
            "remapped positional paid markers to settlement keys"
        );
    }

    fn next_id(&self, taken: impl Fn(&Group, &str) -> bool) -> String {
        let base = Utc::now().timestamp_millis().to_string();
        let mut candidate = base.clone();
        let mut suffix = 1;
        while taken(&self.group, &candidate) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        candidate
    }
}
