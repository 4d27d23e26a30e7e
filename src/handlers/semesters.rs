use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::models::semester::{Semester, SemesterPayload};
use crate::state::AppState;
use crate::utils::error::{AppError, StoreError};
use crate::utils::response::{created, list};

pub async fn get_all(State(state): State<AppState>) -> Result<Response, AppError> {
    let semesters = Semester::find_all(&state.pool).await?;
    Ok(list(semesters.into_iter().map(Semester::into_api).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<SemesterPayload>,
) -> Result<Response, AppError> {
    let new_semester = payload.validate().map_err(AppError::Validation)?;

    let semester = Semester::create(&state.pool, &new_semester)
        .await
        .map_err(|err| match err {
            StoreError::Duplicate => {
                AppError::Duplicate("Semester already exists".to_string())
            }
            other => other.into(),
        })?;

    Ok(created(semester.into_api(), "Semester created"))
}
