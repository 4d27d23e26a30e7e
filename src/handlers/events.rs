use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::event::{Event, EventFilter};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{list, paginated, success, Pagination};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_UPCOMING_LIMIT: i64 = 5;
const MAX_UPCOMING_LIMIT: i64 = 50;

/// Raw query parameters; parsed by hand so malformed values produce the
/// API's validation envelope with every problem listed, rather than a
/// bare extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug)]
pub struct ListingParams {
    pub page: i64,
    pub limit: i64,
    pub filter: EventFilter,
}

fn parse_date_param(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }
    let date: NaiveDate = value.parse().ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

impl EventsQuery {
    pub fn parse(self) -> Result<ListingParams, Vec<String>> {
        let mut errors = Vec::new();

        let page = match self.page.as_deref() {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    errors.push("Page must be a positive integer".to_string());
                    1
                }
            },
        };

        let limit = match self.limit.as_deref() {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => match raw.parse::<i64>() {
                Ok(limit) if (1..=MAX_PAGE_SIZE).contains(&limit) => limit,
                _ => {
                    errors.push(format!("Limit must be between 1 and {MAX_PAGE_SIZE}"));
                    DEFAULT_PAGE_SIZE
                }
            },
        };

        let search = self
            .search
            .map(|value| value.trim().to_string())
            .filter(|value| {
                if value.is_empty() {
                    errors.push("Search query cannot be empty".to_string());
                    false
                } else {
                    true
                }
            });

        let start_date = match self.start_date.as_deref() {
            None => None,
            Some(raw) => match parse_date_param(raw) {
                Some(date) => Some(date),
                None => {
                    errors.push("startDate must be a valid ISO 8601 date".to_string());
                    None
                }
            },
        };

        let end_date = match self.end_date.as_deref() {
            None => None,
            Some(raw) => match parse_date_param(raw) {
                Some(date) => Some(date),
                None => {
                    errors.push("endDate must be a valid ISO 8601 date".to_string());
                    None
                }
            },
        };

        if errors.is_empty() {
            Ok(ListingParams {
                page,
                limit,
                filter: EventFilter {
                    search,
                    start_date,
                    end_date,
                },
            })
        } else {
            Err(errors)
        }
    }
}

pub async fn get_all(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Response, AppError> {
    let params = query.parse().map_err(AppError::Validation)?;

    let page = Event::find_all(&state.pool, &params.filter, params.page, params.limit).await?;

    let pagination = Pagination::new(page.page, page.limit, page.total, page.total_pages);
    Ok(paginated(
        page.events.into_iter().map(Event::into_api).collect(),
        pagination,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<String>,
}

pub async fn get_upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Response, AppError> {
    let limit = match query.limit.as_deref() {
        None => DEFAULT_UPCOMING_LIMIT,
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) if (1..=MAX_UPCOMING_LIMIT).contains(&limit) => limit,
            _ => {
                return Err(AppError::Validation(vec![format!(
                    "Limit must be between 1 and {MAX_UPCOMING_LIMIT}"
                )]))
            }
        },
    };

    let events = Event::find_upcoming(&state.pool, limit).await?;
    Ok(list(events.into_iter().map(Event::into_api).collect()))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation(vec!["Invalid event ID".to_string()]))?;

    let event = Event::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event".to_string()))?;

    Ok(success(event.into_api(), "Event retrieved"))
}
