use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::utils::error::StoreError;
use crate::utils::validate::{check_email, check_required, sanitize};

#[derive(Debug, Clone, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub semester: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMember {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub semester: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPayload {
    pub first_name: String,
    pub last_name: String,
    pub semester: String,
    pub email: Option<String>,
}

#[derive(Debug)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub semester: String,
    pub email: Option<String>,
}

impl MemberPayload {
    pub fn validate(self) -> Result<NewMember, Vec<String>> {
        let mut errors = Vec::new();

        let first_name = sanitize(&self.first_name);
        let last_name = sanitize(&self.last_name);
        let semester = sanitize(&self.semester);
        let email = self
            .email
            .as_deref()
            .map(sanitize)
            .filter(|value| !value.is_empty());

        check_required("First name", &first_name, 100, &mut errors);
        check_required("Last name", &last_name, 100, &mut errors);
        check_required("Semester", &semester, 100, &mut errors);
        if let Some(email) = &email {
            check_email("Email", email, &mut errors);
        }

        if errors.is_empty() {
            Ok(NewMember {
                first_name,
                last_name,
                semester,
                email: email.map(|value| value.to_lowercase()),
            })
        } else {
            Err(errors)
        }
    }
}

impl Member {
    pub fn into_api(self) -> ApiMember {
        ApiMember {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            semester: self.semester,
            email: self.email,
        }
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Member>, StoreError> {
        let rows = sqlx::query_as::<_, Member>(
            "SELECT id, first_name, last_name, semester, email FROM members \
             ORDER BY last_name ASC, first_name ASC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Inserts a member. The semester reference must be checked with
    /// [`crate::models::semester::Semester::exists`] before calling this.
    pub async fn create(pool: &PgPool, new_member: &NewMember) -> Result<Member, StoreError> {
        let row = sqlx::query_as::<_, Member>(
            "INSERT INTO members (first_name, last_name, semester, email) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, first_name, last_name, semester, email",
        )
        .bind(&new_member.first_name)
        .bind(&new_member.last_name)
        .bind(&new_member.semester)
        .bind(&new_member.email)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> MemberPayload {
        MemberPayload {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            semester: "Spring 2026".to_string(),
            email: Some("jd1234@stern.nyu.edu".to_string()),
        }
    }

    #[test]
    fn accepts_a_complete_payload() {
        let new_member = payload().validate().unwrap();
        assert_eq!(new_member.first_name, "Jane");
        assert_eq!(new_member.email.as_deref(), Some("jd1234@stern.nyu.edu"));
    }

    #[test]
    fn email_is_optional() {
        let mut incoming = payload();
        incoming.email = None;
        assert!(incoming.validate().unwrap().email.is_none());

        // Blank emails are treated as absent
        let mut incoming = payload();
        incoming.email = Some("   ".to_string());
        assert!(incoming.validate().unwrap().email.is_none());
    }

    #[test]
    fn collects_every_violation_at_once() {
        let incoming = MemberPayload {
            first_name: String::new(),
            last_name: String::new(),
            semester: String::new(),
            email: Some("bad-email".to_string()),
        };
        let errors = incoming.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
