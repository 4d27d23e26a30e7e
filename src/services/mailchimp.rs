use std::fmt::Write as _;

use async_trait::async_trait;
use md5::{Digest, Md5};
use serde_json::json;
use thiserror::Error;

use crate::config::MailchimpConfig;

const WEBSITE_SIGNUP_TAG: &str = "Website Signup";
const PING_HEALTHY: &str = "Everything's Chimpy!";

#[derive(Debug, Error)]
pub enum MailingListError {
    #[error("mailing list request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mailing list API returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("mailing list client is not configured")]
    Unconfigured,
}

/// The mailing-list operations the signup flow depends on. Backed by the
/// Mailchimp Marketing API in production and by mocks in tests.
#[async_trait]
pub trait MailingList: Send + Sync {
    /// Creates or updates the subscriber for `email`, marking it
    /// "subscribed" if new and tagging it as a website signup.
    async fn upsert_subscriber(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), MailingListError>;

    /// Removes the subscriber for `email` from the list.
    async fn remove_subscriber(&self, email: &str) -> Result<(), MailingListError>;
}

/// Mailchimp's member endpoints are keyed by the MD5 of the lowercased
/// email address rather than by the address itself.
pub fn subscriber_hash(email: &str) -> String {
    let digest = Md5::digest(email.trim().to_lowercase().as_bytes());
    let mut hash = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hash, "{byte:02x}");
    }
    hash
}

pub struct MailchimpClient {
    http: reqwest::Client,
    config: Option<MailchimpConfig>,
}

impl MailchimpClient {
    pub fn new(config: Option<MailchimpConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("Mailchimp is not configured; newsletter signups will fail");
        }
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn config(&self) -> Result<&MailchimpConfig, MailingListError> {
        self.config.as_ref().ok_or(MailingListError::Unconfigured)
    }

    fn base_url(config: &MailchimpConfig) -> String {
        format!(
            "https://{}.api.mailchimp.com/3.0",
            config.server_prefix
        )
    }

    fn member_url(config: &MailchimpConfig, email: &str) -> String {
        format!(
            "{}/lists/{}/members/{}",
            Self::base_url(config),
            config.list_id,
            subscriber_hash(email)
        )
    }

    pub async fn ping(&self) -> Result<(), MailingListError> {
        let config = self.config()?;
        let response = self
            .http
            .get(format!("{}/ping", Self::base_url(config)))
            .basic_auth("anystring", Some(&config.api_key))
            .send()
            .await?;

        let body: serde_json::Value = Self::check(response).await?.json().await?;
        let health_status = body
            .get("health_status")
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        if health_status == PING_HEALTHY {
            Ok(())
        } else {
            Err(MailingListError::Api {
                status: 200,
                detail: format!("unexpected ping response: {health_status}"),
            })
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, MailingListError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("detail")
                    .and_then(|detail| detail.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "no detail provided".to_string());

        Err(MailingListError::Api {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl MailingList for MailchimpClient {
    async fn upsert_subscriber(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), MailingListError> {
        let config = self.config()?;
        let member_url = Self::member_url(config, email);

        let response = self
            .http
            .put(&member_url)
            .basic_auth("anystring", Some(&config.api_key))
            .json(&json!({
                "email_address": email,
                "status_if_new": "subscribed",
                "merge_fields": {
                    "FNAME": first_name,
                    "LNAME": last_name,
                },
            }))
            .send()
            .await?;
        Self::check(response).await?;

        // Tag the member so website signups are distinguishable in the list
        let response = self
            .http
            .post(format!("{member_url}/tags"))
            .basic_auth("anystring", Some(&config.api_key))
            .json(&json!({
                "tags": [{ "name": WEBSITE_SIGNUP_TAG, "status": "active" }],
            }))
            .send()
            .await?;
        Self::check(response).await?;

        tracing::info!(email, "Added/updated Mailchimp subscriber");
        Ok(())
    }

    async fn remove_subscriber(&self, email: &str) -> Result<(), MailingListError> {
        let config = self.config()?;
        let response = self
            .http
            .delete(Self::member_url(config, email))
            .basic_auth("anystring", Some(&config.api_key))
            .send()
            .await?;

        // A missing member means there is nothing left to remove, which is
        // what the compensating call wants to end up with anyway.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response).await?;

        tracing::info!(email, "Removed Mailchimp subscriber");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_lowercase_md5_of_normalized_email() {
        // md5("abc") — the input is trimmed and lowercased first
        assert_eq!(
            subscriber_hash(" ABC "),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(subscriber_hash("abc"), subscriber_hash("ABC"));
    }

    #[test]
    fn hash_is_deterministic_per_email() {
        assert_eq!(
            subscriber_hash("jd1234@stern.nyu.edu"),
            subscriber_hash("JD1234@STERN.NYU.EDU")
        );
        assert_ne!(
            subscriber_hash("jd1234@stern.nyu.edu"),
            subscriber_hash("other@stern.nyu.edu")
        );
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_to_upsert() {
        let client = MailchimpClient::new(None);
        let result = client.upsert_subscriber("a@b.edu", "A", "B").await;
        assert!(matches!(result, Err(MailingListError::Unconfigured)));
    }
}
