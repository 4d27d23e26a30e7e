use mailgun_v3::email::{self, Message, MessageBody};
use mailgun_v3::{Credentials, EmailAddress};

use crate::config::MailgunConfig;

/// Transactional mail sender. Failures are logged and reported as a
/// boolean; email delivery is never part of a consistency contract, so
/// nothing here escalates into the signup flow.
pub struct Mailer {
    config: Option<MailgunConfig>,
}

impl Mailer {
    pub fn new(config: Option<MailgunConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("Mailgun is not configured; notification emails are disabled");
        }
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    pub async fn send(&self, to: &str, subject: &str, text: &str, html: &str) -> bool {
        let Some(config) = &self.config else {
            tracing::warn!("Email not configured - skipping notification");
            return false;
        };

        let Ok(sender_address) = config.from_email.parse() else {
            tracing::error!(address = %config.from_email, "Invalid sender email address");
            return false;
        };
        let sender = EmailAddress::name_address(config.from_name.clone(), sender_address);

        let Ok(recipient_address) = to.parse::<String>() else {
            tracing::error!(address = %to, "Invalid recipient email address");
            return false;
        };

        let body = if html.is_empty() {
            MessageBody::Text(text.to_string())
        } else {
            MessageBody::Html(html.to_string())
        };
        let message = Message {
            to: vec![EmailAddress::address(recipient_address)],
            subject: subject.to_string(),
            body,
            ..Default::default()
        };

        let credentials = Credentials::new(config.token.clone(), config.domain.clone());
        match email::async_impl::send_email(&credentials, &sender, message).await {
            Ok(_) => {
                tracing::info!(to, subject, "Notification email sent");
                true
            }
            Err(err) => {
                tracing::error!(to, subject, error = %err, "Failed to send notification email");
                false
            }
        }
    }
}
