use std::env;

pub mod cors;
pub mod rate_limit;
pub mod referer;
pub mod security;

pub use cors::create_cors_layer;
pub use rate_limit::RateLimiter;
pub use security::create_security_headers_layer;

#[derive(Debug, Clone)]
pub struct MailchimpConfig {
    pub api_key: String,
    pub server_prefix: String,
    pub list_id: String,
}

#[derive(Debug, Clone)]
pub struct MailgunConfig {
    pub token: String,
    pub domain: String,
    pub from_name: String,
    pub from_email: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub environment: String,
    pub frontend_url: Option<String>,
    pub mailchimp: Option<MailchimpConfig>,
    pub mailgun: Option<MailgunConfig>,
    pub contact_notification_email: String,
    /// When set, newsletter signups must use an email under this domain
    /// (e.g. "stern.nyu.edu" also admits "x@mail.stern.nyu.edu").
    pub newsletter_required_domain: Option<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max_requests: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let mailchimp = match (
            env::var("MAILCHIMP_API_KEY"),
            env::var("MAILCHIMP_SERVER_PREFIX"),
            env::var("MAILCHIMP_LIST_ID"),
        ) {
            (Ok(api_key), Ok(server_prefix), Ok(list_id)) => Some(MailchimpConfig {
                api_key,
                server_prefix,
                list_id,
            }),
            _ => None,
        };

        let mailgun = match (env::var("MAILGUN_TOKEN"), env::var("MAILGUN_DOMAIN")) {
            (Ok(token), Ok(domain)) => Some(MailgunConfig {
                token,
                domain,
                from_name: env::var("MAILGUN_FROM_NAME").unwrap_or_else(|_| "SJBA".to_string()),
                from_email: env::var("MAILGUN_FROM_EMAIL")
                    .unwrap_or_else(|_| "mail@sjba.org".to_string()),
            }),
            _ => None,
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/sjba".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(3000),
            environment: env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
            frontend_url: env::var("FRONTEND_URL").ok(),
            mailchimp,
            mailgun,
            contact_notification_email: env::var("CONTACT_NOTIFICATION_EMAIL")
                .unwrap_or_else(|_| "sjba@stern.nyu.edu".to_string()),
            newsletter_required_domain: env::var("NEWSLETTER_REQUIRED_DOMAIN").ok(),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(900),
            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(100),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
