//! Server configuration.

use std::env;

use attendance::{parse_zone, DEFAULT_TIME_ZONE};

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database URL. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Default IANA zone for courses without their own.
    pub time_zone: String,
    /// Log level.
    pub log_level: String,
    /// Emit logs as JSON lines.
    pub log_json: bool,
    /// Fill in missing entry dates at startup and as entries are written
    /// through this server. Entries another process adds while the server
    /// runs are picked up by the next start or the `correct-dates` endpoint.
    pub date_correction: bool,
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let time_zone =
            env::var("ROLLCALL_TIME_ZONE").unwrap_or_else(|_| DEFAULT_TIME_ZONE.to_string());
        parse_zone(&time_zone)?;

        Ok(Self {
            host: env::var("ROLLCALL_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("ROLLCALL_SERVER_PORT")
                .unwrap_or_else(|_| "54880".to_string())
                .parse()
                .unwrap_or(54880),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            time_zone,
            log_level: env::var("ROLLCALL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: flag("ROLLCALL_LOG_JSON", false),
            date_correction: flag("ROLLCALL_DATE_CORRECTION", true),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 54880,
            database_url: None,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            log_level: "info".to_string(),
            log_json: false,
            date_correction: true,
        }
    }
}
