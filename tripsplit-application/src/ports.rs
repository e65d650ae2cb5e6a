use std::collections::HashMap;

use crate::error::StoreError;
use tripsplit_domain::{Group, MemberId};

/// Persistence collaborator holding one serialized group snapshot.
pub trait GroupStore: Send + Sync {
    /// Returns the last stored snapshot, or `None` when nothing was stored yet.
    fn load(&self) -> Result<Option<String>, StoreError>;

    fn save(&self, snapshot: &str) -> Result<(), StoreError>;
}

pub trait MemberDirectory {
    fn display_name(&self, member_id: &MemberId) -> Option<&str>;
}

impl MemberDirectory for Group {
    fn display_name(&self, member_id: &MemberId) -> Option<&str> {
        self.member(member_id).map(|member| member.name.as_str())
    }
}

impl MemberDirectory for HashMap<MemberId, String> {
    fn display_name(&self, member_id: &MemberId) -> Option<&str> {
        self.get(member_id).map(String::as_str)
    }
}
