//! Member endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use stacks_engine::{Deleted, Member, MemberHistory, MemberUpdate, NewMember};

use super::parse_id;
use crate::error::Result;
use crate::handlers::{
    handle_create_member, handle_delete_member, handle_get_member, handle_list_members,
    handle_member_history, handle_update_member, MembersResponse,
};
use crate::AppState;

/// Create member routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/members", get(list_handler).post(create_handler))
        .route(
            "/api/members/{id}",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/api/members/{id}/history", get(history_handler))
}

/// POST /api/members
async fn create_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewMember>, JsonRejection>,
) -> Result<Json<Member>> {
    let Json(request) = payload?;
    Ok(Json(handle_create_member(&state.library, request).await?))
}

/// GET /api/members
async fn list_handler(State(state): State<AppState>) -> Json<MembersResponse> {
    Json(handle_list_members(&state.library).await)
}

/// GET /api/members/{id}
async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Member>> {
    let member_id = parse_id("member", &id)?;
    Ok(Json(handle_get_member(&state.library, member_id).await?))
}

/// PUT /api/members/{id}
async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<MemberUpdate>, JsonRejection>,
) -> Result<Json<Member>> {
    let member_id = parse_id("member", &id)?;
    let Json(update) = payload?;
    Ok(Json(
        handle_update_member(&state.library, member_id, update).await?,
    ))
}

/// DELETE /api/members/{id}
async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let member_id = parse_id("member", &id)?;
    Ok(Json(handle_delete_member(&state.library, member_id).await?))
}

/// GET /api/members/{id}/history
async fn history_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MemberHistory>> {
    let member_id = parse_id("member", &id)?;
    Ok(Json(handle_member_history(&state.library, member_id).await?))
}
