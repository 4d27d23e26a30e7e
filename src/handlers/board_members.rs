use axum::extract::{Path, State};
use axum::response::Response;
use uuid::Uuid;

use crate::models::board_member::BoardMember;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{list, success};

pub async fn get_all(State(state): State<AppState>) -> Result<Response, AppError> {
    let board_members = BoardMember::find_all(&state.pool).await?;
    Ok(list(
        board_members
            .into_iter()
            .map(BoardMember::into_api)
            .collect(),
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation(vec!["Invalid board member ID".to_string()]))?;

    let board_member = BoardMember::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Board member".to_string()))?;

    Ok(success(board_member.into_api(), "Board member retrieved"))
}
