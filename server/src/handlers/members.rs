//! Member handlers.

use super::SharedLibrary;
use crate::error::Result;
use serde::Serialize;
use stacks_engine::{
    Deleted, Member, MemberHistory, MemberId, MemberSummary, MemberUpdate, NewMember,
};

/// Response for listing members.
#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub members: Vec<MemberSummary>,
}

/// Register a new member.
pub async fn handle_create_member(library: &SharedLibrary, request: NewMember) -> Result<Member> {
    let member = library.write().await.create_member(request)?;
    tracing::info!(member_id = member.member_id, "member created");
    Ok(member)
}

pub async fn handle_get_member(library: &SharedLibrary, member_id: MemberId) -> Result<Member> {
    Ok(library.read().await.member(member_id)?)
}

pub async fn handle_list_members(library: &SharedLibrary) -> MembersResponse {
    MembersResponse {
        members: library.read().await.members(),
    }
}

pub async fn handle_update_member(
    library: &SharedLibrary,
    member_id: MemberId,
    update: MemberUpdate,
) -> Result<Member> {
    let member = library.write().await.update_member(member_id, update)?;
    tracing::info!(member_id, "member updated");
    Ok(member)
}

pub async fn handle_delete_member(library: &SharedLibrary, member_id: MemberId) -> Result<Deleted> {
    let deleted = library.write().await.delete_member(member_id)?;
    tracing::info!(member_id, "member deleted");
    Ok(deleted)
}

/// Every transaction a member has made, oldest first.
pub async fn handle_member_history(
    library: &SharedLibrary,
    member_id: MemberId,
) -> Result<MemberHistory> {
    Ok(library.read().await.member_history(member_id)?)
}
