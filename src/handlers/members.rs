use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::models::member::{Member, MemberPayload};
use crate::models::semester::Semester;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, list};

pub async fn get_all(State(state): State<AppState>) -> Result<Response, AppError> {
    let members = Member::find_all(&state.pool).await?;
    Ok(list(members.into_iter().map(Member::into_api).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<MemberPayload>,
) -> Result<Response, AppError> {
    let new_member = payload.validate().map_err(AppError::Validation)?;

    // The semester column is a soft reference; verify it points at a real
    // semester before writing.
    if !Semester::exists(&state.pool, &new_member.semester).await? {
        return Err(AppError::Validation(vec![format!(
            "Invalid semester: '{}' does not exist. Please provide a valid semester name.",
            new_member.semester
        )]));
    }

    let member = Member::create(&state.pool, &new_member).await?;
    Ok(created(member.into_api(), "Member created"))
}
