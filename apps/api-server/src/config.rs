//! Application configuration loaded from environment variables.

use std::env;

use inkpress_infra::DatabaseConfig;
use url::Url;

const DEFAULT_PAGE_SIZE: usize = 6;
const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Credentials of the single admin account.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    /// PHC-format Argon2 hash.
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub page_size: usize,
    /// Root that share links and permalinks are built on.
    pub public_base_url: Url,
    /// `None` disables admin login.
    pub admin: Option<AdminCredentials>,
}

impl AppConfig {
    /// Fails only when `PUBLIC_BASE_URL` is not a valid URL.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut db = DatabaseConfig::new(url);
            if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
                db.max_connections = max;
            }
            if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
                db.min_connections = min;
            }
            db
        });

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD_HASH")) {
            (Ok(email), Ok(password_hash)) => Some(AdminCredentials {
                email,
                password_hash,
            }),
            _ => {
                tracing::warn!("ADMIN_EMAIL or ADMIN_PASSWORD_HASH not set. Admin login disabled.");
                None
            }
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            page_size: parse_var("POSTS_PAGE_SIZE")
                .filter(|&size| size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            public_base_url: public_base_url(env::var("PUBLIC_BASE_URL").ok())?,
            admin,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Parse the public base URL, forcing a trailing slash so relative joins
/// keep the path prefix.
pub fn public_base_url(raw: Option<String>) -> Result<Url, url::ParseError> {
    let raw = raw.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    if raw.ends_with('/') {
        Url::parse(&raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = public_base_url(Some("https://blog.example.com/journal".into())).unwrap();

        assert_eq!(url.as_str(), "https://blog.example.com/journal/");
    }

    #[test]
    fn missing_base_url_uses_localhost() {
        let url = public_base_url(None).unwrap();

        assert_eq!(url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(public_base_url(Some("not a url".into())).is_err());
    }
}
