use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::utils::error::StoreError;
use crate::utils::validate::{check_required, is_valid_email, sanitize};

#[derive(Debug, Clone, FromRow)]
pub struct NewsletterSignup {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNewsletterSignup {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// The signup form posts snake_case field names.
#[derive(Debug, Deserialize)]
pub struct SignupPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A signup that passed validation; the email is trimmed and lowercased.
#[derive(Debug, Clone)]
pub struct NewSignup {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl SignupPayload {
    pub fn validate(self, required_domain: Option<&str>) -> Result<NewSignup, Vec<String>> {
        let mut errors = Vec::new();

        let email = sanitize(&self.email).to_lowercase();
        let first_name = sanitize(&self.first_name);
        let last_name = sanitize(&self.last_name);

        if email.is_empty() {
            errors.push("Email is required".to_string());
        } else if !is_valid_email(&email) {
            errors.push("Please provide a valid email address".to_string());
        } else if let Some(domain) = required_domain {
            let domain = domain.to_lowercase();
            let at_domain = format!("@{domain}");
            if !email.ends_with(&at_domain) && !email.ends_with(&format!(".{domain}")) {
                errors.push(format!("Please use your {domain} email address"));
            }
        }

        check_required("First name", &first_name, 50, &mut errors);
        check_required("Last name", &last_name, 50, &mut errors);

        if errors.is_empty() {
            Ok(NewSignup {
                email,
                first_name,
                last_name,
            })
        } else {
            Err(errors)
        }
    }
}

impl NewsletterSignup {
    pub fn into_api(self) -> ApiNewsletterSignup {
        ApiNewsletterSignup {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at: self.created_at,
        }
    }
}

/// Persistence seam for newsletter signups, so the reconciliation flow can
/// be exercised against an in-memory store in tests.
#[async_trait]
pub trait SignupStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSignup>, StoreError>;

    async fn insert(&self, signup: &NewSignup) -> Result<NewsletterSignup, StoreError>;

    async fn update_names(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> Result<NewsletterSignup, StoreError>;
}

pub struct PgSignupStore {
    pool: PgPool,
}

impl PgSignupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, email, first_name, last_name, created_at";

#[async_trait]
impl SignupStore for PgSignupStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSignup>, StoreError> {
        let row = sqlx::query_as::<_, NewsletterSignup>(&format!(
            "SELECT {COLUMNS} FROM newsletter_signups WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, signup: &NewSignup) -> Result<NewsletterSignup, StoreError> {
        let row = sqlx::query_as::<_, NewsletterSignup>(&format!(
            "INSERT INTO newsletter_signups (email, first_name, last_name) \
             VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(&signup.email)
        .bind(&signup.first_name)
        .bind(&signup.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_names(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> Result<NewsletterSignup, StoreError> {
        let row = sqlx::query_as::<_, NewsletterSignup>(&format!(
            "UPDATE newsletter_signups SET first_name = $2, last_name = $3 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(email: &str) -> SignupPayload {
        SignupPayload {
            email: email.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    #[test]
    fn normalizes_email_case_and_whitespace() {
        let signup = payload("  JD1234@Stern.NYU.edu ").validate(None).unwrap();
        assert_eq!(signup.email, "jd1234@stern.nyu.edu");
    }

    #[test]
    fn enforces_the_configured_domain_suffix() {
        let errors = payload("jane@gmail.com")
            .validate(Some("stern.nyu.edu"))
            .unwrap_err();
        assert_eq!(
            errors,
            vec!["Please use your stern.nyu.edu email address".to_string()]
        );

        assert!(payload("jd1234@stern.nyu.edu")
            .validate(Some("stern.nyu.edu"))
            .is_ok());
        // Subdomains of the required domain are accepted
        assert!(payload("jd1234@mail.stern.nyu.edu")
            .validate(Some("stern.nyu.edu"))
            .is_ok());
    }

    #[test]
    fn no_domain_restriction_by_default() {
        assert!(payload("jane@gmail.com").validate(None).is_ok());
    }

    #[test]
    fn collects_all_violations_at_once() {
        let incoming = SignupPayload {
            email: "bad".to_string(),
            first_name: String::new(),
            last_name: "x".repeat(51),
        };
        let errors = incoming.validate(None).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
