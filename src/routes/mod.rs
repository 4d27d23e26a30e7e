use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::rate_limit::rate_limit;
use crate::config::referer::validate_referer;
use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{self, board_members, contact, events, members, newsletter, semesters};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api_v1 = Router::new()
        .route("/board-members", get(board_members::get_all))
        .route("/board-members/:id", get(board_members::get_by_id))
        .route("/events", get(events::get_all))
        .route("/events/upcoming", get(events::get_upcoming))
        .route("/events/:id", get(events::get_by_id))
        .route("/members", get(members::get_all).post(members::create))
        .route("/semesters", get(semesters::get_all).post(semesters::create))
        .route("/contact", post(contact::submit))
        .route("/newsletter-sign-ups", post(newsletter::sign_up))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            validate_referer,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(state.config.is_production()))
        .layer(create_cors_layer(state.config.frontend_url.as_deref()))
        .with_state(state)
}
