use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::utils::error::StoreError;
use crate::utils::validate::{check_required, sanitize};

#[derive(Debug, Clone, FromRow)]
pub struct Semester {
    pub id: Uuid,
    pub semester_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSemester {
    pub id: Uuid,
    pub semester_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterPayload {
    pub semester_name: String,
}

/// A semester name that passed validation.
#[derive(Debug)]
pub struct NewSemester {
    pub semester_name: String,
}

impl SemesterPayload {
    pub fn validate(self) -> Result<NewSemester, Vec<String>> {
        let mut errors = Vec::new();
        let semester_name = sanitize(&self.semester_name);
        check_required("Semester name", &semester_name, 100, &mut errors);

        if errors.is_empty() {
            Ok(NewSemester { semester_name })
        } else {
            Err(errors)
        }
    }
}

impl Semester {
    pub fn into_api(self) -> ApiSemester {
        ApiSemester {
            id: self.id,
            semester_name: self.semester_name,
        }
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Semester>, StoreError> {
        let rows = sqlx::query_as::<_, Semester>(
            "SELECT id, semester_name FROM semesters ORDER BY semester_name ASC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn exists(pool: &PgPool, semester_name: &str) -> Result<bool, StoreError> {
        let found: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM semesters WHERE semester_name = $1")
                .bind(semester_name)
                .fetch_optional(pool)
                .await?;
        Ok(found.is_some())
    }

    /// Inserts a semester; a unique-index violation surfaces as
    /// [`StoreError::Duplicate`].
    pub async fn create(pool: &PgPool, new_semester: &NewSemester) -> Result<Semester, StoreError> {
        let row = sqlx::query_as::<_, Semester>(
            "INSERT INTO semesters (semester_name) VALUES ($1) RETURNING id, semester_name",
        )
        .bind(&new_semester.semester_name)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }
}
