use doclabel_core::retry::{RetryPolicy, DEFAULT_MAX_WRITE_ATTEMPTS, MAX_CONFIGURABLE_ATTEMPTS};
use doclabel_core::span::OverlapPolicy;
use doclabel_db::writer::WriterConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Retry bound and overlap rule for annotation writes.
    pub annotation: WriterConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `ANNOTATION_MAX_WRITE_ATTEMPTS` | `5`                     |
    /// | `SPAN_OVERLAP_POLICY`           | `strict`                |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on any unparseable value, and if
    /// `ANNOTATION_MAX_WRITE_ATTEMPTS` is outside `1..=50`.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_write_attempts = std::env::var("ANNOTATION_MAX_WRITE_ATTEMPTS")
            .map(|raw| parse_max_write_attempts(&raw))
            .unwrap_or(Ok(DEFAULT_MAX_WRITE_ATTEMPTS))
            .unwrap_or_else(|e| panic!("ANNOTATION_MAX_WRITE_ATTEMPTS: {e}"));

        let overlap: OverlapPolicy = std::env::var("SPAN_OVERLAP_POLICY")
            .unwrap_or_else(|_| OverlapPolicy::default().as_str().into())
            .parse()
            .unwrap_or_else(|e| panic!("SPAN_OVERLAP_POLICY: {e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            annotation: WriterConfig {
                retry: RetryPolicy::new(max_write_attempts),
                overlap,
            },
        }
    }
}

/// Parse a write-attempt budget, refusing values [`RetryPolicy::new`] would
/// otherwise clamp.
fn parse_max_write_attempts(raw: &str) -> Result<u32, String> {
    let attempts: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a valid u32"))?;
    if !(1..=MAX_CONFIGURABLE_ATTEMPTS).contains(&attempts) {
        return Err(format!(
            "{attempts} is outside 1..={MAX_CONFIGURABLE_ATTEMPTS}"
        ));
    }
    Ok(attempts)
}
