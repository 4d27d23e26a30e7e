use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use crate::state::AppState;
use crate::utils::response::error as error_response;

/// Rejects browser requests whose Referer/Origin does not match the
/// configured frontend. Requests without either header (curl, server-to-
/// server calls) are allowed through.
pub async fn validate_referer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.is_production() {
        return next.run(request).await;
    }

    let referer = request
        .headers()
        .get(header::REFERER)
        .or_else(|| request.headers().get(header::ORIGIN))
        .and_then(|value| value.to_str().ok());

    let Some(referer) = referer else {
        return next.run(request).await;
    };

    let Some(frontend_url) = &state.config.frontend_url else {
        return next.run(request).await;
    };

    let allowed_domain = frontend_url
        .trim_start_matches("https://")
        .trim_start_matches("http://");

    if referer.contains(allowed_domain) {
        next.run(request).await
    } else {
        tracing::warn!(referer, "Blocked request with invalid referer");
        error_response(
            "INVALID_REFERER",
            "Forbidden - Invalid referer",
            None,
            StatusCode::FORBIDDEN,
        )
    }
}
