use chrono::{DateTime, Utc};
use fxhash::FxHashSet;
use rust_decimal::Decimal;

use crate::{
    error::BillValidationError,
    model::{Bill, BillId, Group, MemberId, Money, SplitRatio, Weight},
};

/// How a new bill is divided among members.
#[derive(Clone, Debug, PartialEq)]
pub enum SplitMode {
    /// Every selected member carries weight 1, everyone else 0.
    Equal(Vec<MemberId>),
    /// Explicit weights; members left out carry weight 0.
    Custom(SplitRatio),
}

/// Unvalidated bill input as entered by a user.
#[derive(Clone, Debug, PartialEq)]
pub struct BillDraft {
    pub description: String,
    pub amount: Money,
    pub category: String,
    pub paid_by: MemberId,
    pub split: SplitMode,
}

impl BillDraft {
    /// Validates the draft against `group` and produces a bill whose split ratio
    /// lists every current member.
    pub fn validate(
        self,
        group: &Group,
        id: BillId,
        created_at: DateTime<Utc>,
    ) -> Result<Bill, BillValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(BillValidationError::EmptyDescription);
        }
        if !self.amount.is_positive() {
            return Err(BillValidationError::NonPositiveAmount);
        }
        if !group.has_member(&self.paid_by) {
            return Err(BillValidationError::UnknownPayer(self.paid_by));
        }

        let split_ratio = match self.split {
            SplitMode::Equal(selected) => {
                let selected: FxHashSet<MemberId> = selected.into_iter().collect();
                if let Some(unknown) = selected.iter().find(|id| !group.has_member(id)) {
                    return Err(BillValidationError::UnknownParticipant(unknown.clone()));
                }
                group
                    .members
                    .iter()
                    .map(|member| {
                        let weight = if selected.contains(&member.id) {
                            Decimal::ONE
                        } else {
                            Decimal::ZERO
                        };
                        (member.id.clone(), weight)
                    })
                    .collect::<SplitRatio>()
            }
            SplitMode::Custom(weights) => {
                for (member, weight) in &weights {
                    if !group.has_member(member) {
                        return Err(BillValidationError::UnknownParticipant(member.clone()));
                    }
                    if weight.is_sign_negative() && !weight.is_zero() {
                        return Err(BillValidationError::NegativeWeight(member.clone()));
                    }
                }
                group
                    .members
                    .iter()
                    .map(|member| {
                        let weight = weights.get(&member.id).copied().unwrap_or(Decimal::ZERO);
                        (member.id.clone(), weight)
                    })
                    .collect::<SplitRatio>()
            }
        };

        let total: Weight = split_ratio.values().copied().sum();
        if total <= Decimal::ZERO {
            return Err(BillValidationError::DegenerateSplit);
        }

        Ok(Bill {
            id,
            description: description.to_owned(),
            amount: self.amount,
            category: self.category,
            paid_by: self.paid_by,
            split_ratio,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Member;
    use rstest::{fixture, rstest};

    #[fixture]
    fn group() -> Group {
        let mut group = Group::new("g1", "Trip");
        group.members = vec![
            Member::new("a", "Asha"),
            Member::new("b", "Bilal"),
            Member::new("c", "Chen"),
        ];
        group
    }

    fn draft(split: SplitMode) -> BillDraft {
        BillDraft {
            description: "  Taxi  ".to_owned(),
            amount: Money::from_i64(90),
            category: "Transportation".to_owned(),
            paid_by: MemberId::from("a"),
            split,
        }
    }

    fn weights(pairs: &[(&str, i64)]) -> SplitRatio {
        pairs
            .iter()
            .map(|(member, weight)| (MemberId::from(*member), Decimal::from(*weight)))
            .collect()
    }

    #[rstest]
    fn equal_split_lists_every_member(group: Group) {
        let bill = draft(SplitMode::Equal(vec![MemberId::from("a"), MemberId::from("b")]))
            .validate(&group, BillId::from("1"), DateTime::<Utc>::UNIX_EPOCH)
            .unwrap();

        assert_eq!(bill.description, "Taxi");
        assert_eq!(bill.split_ratio, weights(&[("a", 1), ("b", 1), ("c", 0)]));
    }

    #[rstest]
    fn custom_split_fills_missing_members_with_zero(group: Group) {
        let bill = draft(SplitMode::Custom(weights(&[("a", 2), ("c", 1)])))
            .validate(&group, BillId::from("1"), DateTime::<Utc>::UNIX_EPOCH)
            .unwrap();

        assert_eq!(bill.split_ratio, weights(&[("a", 2), ("b", 0), ("c", 1)]));
        assert_eq!(bill.total_weight(), Decimal::from(3));
    }

    #[rstest]
    #[case::blank_description(
        BillDraft { description: "   ".to_owned(), ..draft(SplitMode::Equal(vec![MemberId::from("a")])) },
        BillValidationError::EmptyDescription
    )]
    #[case::zero_amount(
        BillDraft { amount: Money::ZERO, ..draft(SplitMode::Equal(vec![MemberId::from("a")])) },
        BillValidationError::NonPositiveAmount
    )]
    #[case::unknown_payer(
        BillDraft { paid_by: MemberId::from("z"), ..draft(SplitMode::Equal(vec![MemberId::from("a")])) },
        BillValidationError::UnknownPayer(MemberId::from("z"))
    )]
    #[case::empty_selection(draft(SplitMode::Equal(vec![])), BillValidationError::DegenerateSplit)]
    #[case::unknown_participant(
        draft(SplitMode::Equal(vec![MemberId::from("z")])),
        BillValidationError::UnknownParticipant(MemberId::from("z"))
    )]
    #[case::negative_weight(
        draft(SplitMode::Custom(weights(&[("a", 2), ("b", -1)]))),
        BillValidationError::NegativeWeight(MemberId::from("b"))
    )]
    #[case::all_zero_weights(
        draft(SplitMode::Custom(weights(&[("a", 0), ("b", 0)]))),
        BillValidationError::DegenerateSplit
    )]
    fn rejects_invalid_drafts(
        group: Group,
        #[case] input: BillDraft,
        #[case] expected: BillValidationError,
    ) {
        let result = input.validate(&group, BillId::from("1"), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(result, Err(expected));
    }
}
