use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::models::contact::{ContactPayload, ContactSubmission};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::created;

pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<ContactPayload>,
) -> Result<Response, AppError> {
    let new_submission = payload.validate().map_err(AppError::Validation)?;

    let submission = ContactSubmission::create(&state.pool, &new_submission).await?;

    // The submission row is already saved; a failed notification is
    // reported to the caller but does not roll it back.
    let sent = state
        .mailer
        .send(
            &state.config.contact_notification_email,
            &submission.notification_subject(),
            &submission.notification_text(),
            &submission.notification_html(),
        )
        .await;

    if !sent {
        return Err(AppError::EmailSend(format!(
            "contact notification for submission {} was not sent",
            submission.id
        )));
    }

    Ok(created(
        submission.into_api(),
        "Thank you for your message. We will get back to you soon!",
    ))
}
