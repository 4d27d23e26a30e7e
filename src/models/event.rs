use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::utils::error::StoreError;

#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub company: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub flyer_file: Option<String>,
    pub rsvp_link: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub company: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub flyer_file: Option<String>,
    pub rsvp_link: Option<String>,
    pub description: Option<String>,
}

/// Filters shared by the count query and the page query. Both must apply
/// the same conditions so the reported total matches the page slices.
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<Event>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

const COLUMNS: &str = "id, created_at, updated_at, title, company, start_time, \
                       end_time, location, flyer_file, rsvp_link, description";

fn push_filters(builder: &mut QueryBuilder<Postgres>, filter: &EventFilter) {
    let mut prefix = " WHERE ";

    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        builder
            .push(prefix)
            .push("(title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
        prefix = " AND ";
    }

    if let Some(start_date) = filter.start_date {
        builder
            .push(prefix)
            .push("start_time >= ")
            .push_bind(start_date);
        prefix = " AND ";
    }

    if let Some(end_date) = filter.end_date {
        builder
            .push(prefix)
            .push("start_time <= ")
            .push_bind(end_date);
    }
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

impl Event {
    pub fn into_api(self) -> ApiEvent {
        ApiEvent {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            title: self.title,
            company: self.company,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            flyer_file: self.flyer_file,
            rsvp_link: self.rsvp_link,
            description: self.description,
        }
    }

    pub async fn find_all(
        pool: &PgPool,
        filter: &EventFilter,
        page: i64,
        limit: i64,
    ) -> Result<EventPage, StoreError> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM events");
        push_filters(&mut count_builder, filter);
        let total: i64 = count_builder.build_query_scalar().fetch_one(pool).await?;

        let mut page_builder = QueryBuilder::new(format!("SELECT {COLUMNS} FROM events"));
        push_filters(&mut page_builder, filter);
        page_builder
            .push(" ORDER BY start_time ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind((page - 1) * limit);
        let events = page_builder.build_query_as::<Event>().fetch_all(pool).await?;

        Ok(EventPage {
            events,
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        })
    }

    pub async fn find_upcoming(pool: &PgPool, limit: i64) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {COLUMNS} FROM events WHERE start_time >= $1 \
             ORDER BY start_time ASC LIMIT $2"
        ))
        .bind(Utc::now())
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(events)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Event>, StoreError> {
        let event =
            sqlx::query_as::<_, Event>(&format!("SELECT {COLUMNS} FROM events WHERE id = $1"))
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn full_filter() -> EventFilter {
        EventFilter {
            search: Some("banking".to_string()),
            start_date: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()),
        }
    }

    fn where_clause(filter: &EventFilter) -> String {
        let mut builder = QueryBuilder::new("");
        push_filters(&mut builder, filter);
        builder.sql().to_string()
    }

    #[test]
    fn no_filters_produces_no_where_clause() {
        assert_eq!(where_clause(&EventFilter::default()), "");
    }

    #[test]
    fn search_filter_covers_title_and_description() {
        let sql = where_clause(&EventFilter {
            search: Some("banking".to_string()),
            ..Default::default()
        });
        assert!(sql.contains("title ILIKE"));
        assert!(sql.contains("description ILIKE"));
        assert!(sql.starts_with(" WHERE "));
    }

    #[test]
    fn date_filters_are_inclusive_on_start_time() {
        let sql = where_clause(&full_filter());
        assert!(sql.contains("start_time >= "));
        assert!(sql.contains("start_time <= "));
        assert_eq!(sql.matches(" AND ").count(), 2);
    }

    #[test]
    fn count_and_page_queries_share_the_same_filters() {
        let filter = full_filter();

        let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events");
        push_filters(&mut count_builder, &filter);

        let mut page_builder = QueryBuilder::<Postgres>::new("SELECT * FROM events");
        push_filters(&mut page_builder, &filter);

        let count_where = count_builder.sql().trim_start_matches("SELECT COUNT(*) FROM events").to_string();
        let page_where = page_builder.sql().trim_start_matches("SELECT * FROM events").to_string();
        assert_eq!(count_where, page_where);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(35, 10), 4);
    }
}
