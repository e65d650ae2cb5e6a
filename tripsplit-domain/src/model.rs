use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet},
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::GroupEditError;

/// Number of decimal places every settlement amount is rounded to.
pub const CENT_SCALE: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(SmolStr);

impl MemberId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for MemberId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(SmolStr);

impl BillId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for BillId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed decimal currency amount without a fixed minor unit.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    /// One minor unit at [`CENT_SCALE`]; the tolerance used by settlement comparisons.
    pub fn cent() -> Self {
        Self::new(1, CENT_SCALE)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// `true` when the magnitude does not exceed `tolerance`.
    pub fn is_within(self, tolerance: Money) -> bool {
        self.abs() <= tolerance
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Clamps at the representable bounds instead of overflowing.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Saturating, so totals over very large amounts clamp instead of panicking.
impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Relative share of a bill; zero excludes the member from the split.
pub type Weight = Decimal;

/// Per-bill weights keyed by member.
pub type SplitRatio = BTreeMap<MemberId, Weight>;

/// Net signed position of every member (positive = owed money).
pub type MemberBalances = BTreeMap<MemberId, Money>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: BillId,
    pub description: String,
    pub amount: Money,
    #[serde(default)]
    pub category: String,
    pub paid_by: MemberId,
    pub split_ratio: SplitRatio,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    pub fn total_weight(&self) -> Weight {
        self.split_ratio.values().copied().sum()
    }

    /// Members carrying a nonzero weight in this bill.
    pub fn participants(&self) -> impl Iterator<Item = (&MemberId, Weight)> + '_ {
        self.split_ratio
            .iter()
            .filter(|(_, weight)| !weight.is_zero())
            .map(|(member, weight)| (member, *weight))
    }

    /// `true` when the member pays this bill or is listed in its split, even at weight zero.
    pub fn mentions(&self, member: &MemberId) -> bool {
        self.paid_by == *member || self.split_ratio.contains_key(member)
    }
}

/// Stable identity of a planned settlement, used to persist paid-state.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettlementKey {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// A suggested payment: `from` owes `to` the given amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

impl Settlement {
    pub fn key(&self) -> SettlementKey {
        SettlementKey {
            from: self.from.clone(),
            to: self.to.clone(),
            amount: self.amount.round_cents(),
        }
    }
}

/// Set of settlements marked as paid, keyed by settlement identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaidSettlements(BTreeSet<SettlementKey>);

impl PaidSettlements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paid(&self, settlement: &Settlement) -> bool {
        self.0.contains(&settlement.key())
    }

    /// Flips the paid flag and returns the new state.
    pub fn toggle(&mut self, settlement: &Settlement) -> bool {
        let key = settlement.key();
        if self.0.remove(&key) {
            false
        } else {
            self.0.insert(key);
            true
        }
    }

    pub fn mark_paid(&mut self, settlement: &Settlement) {
        self.0.insert(settlement.key());
    }

    /// Builds paid-state from positional indices into `plan`; out-of-range indices are ignored.
    pub fn from_indices<I>(plan: &[Settlement], indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self(
            indices
                .into_iter()
                .filter_map(|index| plan.get(index))
                .map(Settlement::key)
                .collect(),
        )
    }

    /// Positions within `plan` currently marked as paid.
    pub fn to_indices(&self, plan: &[Settlement]) -> BTreeSet<usize> {
        plan.iter()
            .enumerate()
            .filter(|(_, settlement)| self.is_paid(settlement))
            .map(|(index, _)| index)
            .collect()
    }

    /// Drops keys that no longer correspond to any settlement in `plan`.
    ///
    /// Returns the number of keys removed.
    pub fn retain_current(&mut self, plan: &[Settlement]) -> usize {
        let current: BTreeSet<SettlementKey> = plan.iter().map(Settlement::key).collect();
        let before = self.0.len();
        self.0.retain(|key| current.contains(key));
        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SettlementKey> + '_ {
        self.0.iter()
    }
}

impl FromIterator<SettlementKey> for PaidSettlements {
    fn from_iter<T: IntoIterator<Item = SettlementKey>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub paid_settlements: PaidSettlements,
    /// Positional paid markers written by older snapshots; remapped on load.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paid_settlement_indices: Vec<usize>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id == *id)
    }

    pub fn has_member(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }

    pub fn bill(&self, id: &BillId) -> Option<&Bill> {
        self.bills.iter().find(|bill| bill.id == *id)
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), GroupEditError> {
        if member.name.trim().is_empty() {
            return Err(GroupEditError::BlankMemberName);
        }
        if self.has_member(&member.id) {
            return Err(GroupEditError::DuplicateMember(member.id));
        }
        self.members.push(member);
        Ok(())
    }

    /// Removes the member together with every bill that mentions them.
    ///
    /// Returns the removed bills.
    pub fn remove_member(&mut self, id: &MemberId) -> Result<Vec<Bill>, GroupEditError> {
        let position = self
            .members
            .iter()
            .position(|member| member.id == *id)
            .ok_or_else(|| GroupEditError::UnknownMember(id.clone()))?;
        self.members.remove(position);

        let (removed, kept): (Vec<Bill>, Vec<Bill>) = std::mem::take(&mut self.bills)
            .into_iter()
            .partition(|bill| bill.mentions(id));
        self.bills = kept;
        Ok(removed)
    }

    /// Inserts the bill or replaces the one with the same id. Returns the replaced bill.
    pub fn upsert_bill(&mut self, bill: Bill) -> Option<Bill> {
        match self.bills.iter_mut().find(|existing| existing.id == bill.id) {
            Some(existing) => Some(std::mem::replace(existing, bill)),
            None => {
                self.bills.push(bill);
                None
            }
        }
    }

    pub fn remove_bill(&mut self, id: &BillId) -> Result<Bill, GroupEditError> {
        let position = self
            .bills
            .iter()
            .position(|bill| bill.id == *id)
            .ok_or_else(|| GroupEditError::UnknownBill(id.clone()))?;
        Ok(self.bills.remove(position))
    }
}
