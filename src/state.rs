use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{Config, RateLimiter};
use crate::models::newsletter::SignupStore;
use crate::services::mailchimp::MailingList;
use crate::services::mailer::Mailer;

/// Shared handles constructed once at startup and cloned into every
/// request-handling task.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub mailing_list: Arc<dyn MailingList>,
    pub signup_store: Arc<dyn SignupStore>,
    pub mailer: Arc<Mailer>,
    pub rate_limiter: Arc<RateLimiter>,
}
