use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::models::newsletter::SignupPayload;
use crate::services::newsletter::{process_signup, SignupOutcome};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<Response, AppError> {
    let signup = payload
        .validate(state.config.newsletter_required_domain.as_deref())
        .map_err(AppError::Validation)?;

    let outcome = process_signup(
        state.mailing_list.as_ref(),
        state.signup_store.as_ref(),
        signup,
    )
    .await?;

    let message = "Successfully signed up for newsletter";
    Ok(match outcome {
        SignupOutcome::Created(record) => created(record.into_api(), message),
        SignupOutcome::Updated(record) => success(record.into_api(), message),
    })
}
