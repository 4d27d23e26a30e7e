pub mod mailchimp;
pub mod mailer;
pub mod newsletter;
