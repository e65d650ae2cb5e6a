use thiserror::Error;

use crate::model::{BillId, MemberId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupEditError {
    #[error("member '{0}' already exists")]
    DuplicateMember(MemberId),
    #[error("member '{0}' does not exist")]
    UnknownMember(MemberId),
    #[error("bill '{0}' does not exist")]
    UnknownBill(BillId),
    #[error("member name must not be blank")]
    BlankMemberName,
}

/// Reasons a bill draft is rejected before it reaches the group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillValidationError {
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("payer '{0}' is not a member of the group")]
    UnknownPayer(MemberId),
    #[error("split member '{0}' is not a member of the group")]
    UnknownParticipant(MemberId),
    #[error("split weight for '{0}' must not be negative")]
    NegativeWeight(MemberId),
    #[error("split weights must include at least one member")]
    DegenerateSplit,
}
