use std::env;

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_ttl_hours: i64,
    pub db_max_connections: u32,
    pub admin_username: String,
    /// When set and no account exists yet, an admin is created at startup.
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let session_ttl_hours = session_ttl_hours(env::var("SESSION_TTL_HOURS").ok().as_deref());
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(10);
        let admin_username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());

        Ok(Self {
            database_url,
            bind_addr,
            session_ttl_hours,
            db_max_connections,
            admin_username,
            admin_password,
        })
    }
}

/// Parsed `SESSION_TTL_HOURS`, clamped to one hour .. one year.
fn session_ttl_hours(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_SESSION_TTL_HOURS)
        .clamp(1, MAX_SESSION_TTL_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ttl_is_clamped() {
        assert_eq!(session_ttl_hours(None), 24);
        assert_eq!(session_ttl_hours(Some("8")), 8);
        assert_eq!(session_ttl_hours(Some("soon")), 24);
        assert_eq!(session_ttl_hours(Some("-5")), 1);
        assert_eq!(session_ttl_hours(Some("0")), 1);
        assert_eq!(session_ttl_hours(Some("9223372036854775807")), MAX_SESSION_TTL_HOURS);
    }
}
