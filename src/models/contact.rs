use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::utils::error::StoreError;
use crate::utils::validate::{check_email, check_optional, check_required, sanitize};

#[derive(Debug, Clone, FromRow)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContactSubmission {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
}

#[derive(Debug)]
pub struct NewContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
}

impl ContactPayload {
    pub fn validate(self) -> Result<NewContactSubmission, Vec<String>> {
        let mut errors = Vec::new();

        let first_name = sanitize(&self.first_name);
        let last_name = sanitize(&self.last_name);
        let email = sanitize(&self.email);
        let company = self
            .company
            .as_deref()
            .map(sanitize)
            .filter(|value| !value.is_empty());
        let message = sanitize(&self.message);

        check_required("First name", &first_name, 100, &mut errors);
        check_required("Last name", &last_name, 100, &mut errors);
        check_email("Email", &email, &mut errors);
        check_optional("Company", company.as_deref(), 255, &mut errors);
        check_required("Message", &message, 5000, &mut errors);

        if errors.is_empty() {
            Ok(NewContactSubmission {
                first_name,
                last_name,
                email: email.to_lowercase(),
                company,
                message,
            })
        } else {
            Err(errors)
        }
    }
}

impl ContactSubmission {
    pub fn into_api(self) -> ApiContactSubmission {
        ApiContactSubmission {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            company: self.company,
            message: self.message,
            created_at: self.created_at,
        }
    }

    pub async fn create(
        pool: &PgPool,
        submission: &NewContactSubmission,
    ) -> Result<ContactSubmission, StoreError> {
        let row = sqlx::query_as::<_, ContactSubmission>(
            "INSERT INTO contact_submissions (first_name, last_name, email, company, message) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, first_name, last_name, email, company, message, created_at",
        )
        .bind(&submission.first_name)
        .bind(&submission.last_name)
        .bind(&submission.email)
        .bind(&submission.company)
        .bind(&submission.message)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub fn notification_subject(&self) -> String {
        format!(
            "Contact Form Submission from {} {}",
            self.first_name, self.last_name
        )
    }

    pub fn notification_text(&self) -> String {
        format!(
            "New Contact Form Submission\n\n\
             Name: {} {}\n\
             Email: {}\n\
             Company: {}\n\n\
             Message:\n{}\n\n\
             ---\n\
             Submitted at: {}",
            self.first_name,
            self.last_name,
            self.email,
            self.company.as_deref().unwrap_or("Not provided"),
            self.message,
            self.created_at.to_rfc3339(),
        )
    }

    pub fn notification_html(&self) -> String {
        format!(
            "<h2>New Contact Form Submission</h2>\
             <p><strong>Name:</strong> {} {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p><strong>Company:</strong> {}</p>\
             <p><strong>Message:</strong></p><p>{}</p>\
             <hr><p>Submitted at: {}</p>",
            self.first_name,
            self.last_name,
            self.email,
            self.company.as_deref().unwrap_or("Not provided"),
            self.message,
            self.created_at.to_rfc3339(),
        )
    }
}
