use std::path::PathBuf;

use chrono_tz::Tz;

use crate::metrics::LabelLocale;
use crate::utils::time::parse_timezone;

use super::ServerError;

pub const DEFAULT_TIMEZONE: &str = "America/Argentina/Buenos_Aires";

/// Persistence backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// redb file at `DATABASE_PATH`
    Local,
    /// PostgREST-style table API
    Remote { url: String, api_key: String },
}

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | working directory |
/// | HTTP_PORT | 3000 | HTTP port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | tracing filter |
/// | LOG_DIR | - | daily rolling log directory |
/// | STORE_BACKEND | local | `local` or `remote` |
/// | DATABASE_PATH | $WORK_DIR/mostrador.redb | local store file |
/// | REMOTE_URL / REMOTE_API_KEY | - | remote table API |
/// | TIMEZONE | America/Argentina/Buenos_Aires | business timezone |
/// | LABEL_LOCALE | es | chart label language |
/// | ACTIVE_CLIENT_WINDOW_DAYS | 30 | active-client window |
/// | TOP_PRODUCTS_WINDOW_DAYS | 30 | default top-products window |
/// | REQUEST_TIMEOUT_MS | 30000 | request timeout (ms) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | graceful shutdown grace (ms) |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/mostrador HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub backend: StoreBackend,
    pub database_path: PathBuf,
    pub timezone: Tz,
    pub label_locale: LabelLocale,
    pub active_client_window_days: u32,
    pub top_products_window_days: u32,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Unparseable numbers fall back to their defaults. A `remote` backend
    /// without `REMOTE_URL` is an error.
    pub fn from_env() -> Result<Self, ServerError> {
        let work_dir = env_opt("WORK_DIR").unwrap_or_else(|| "./data".into());

        let backend = match env_opt("STORE_BACKEND")
            .unwrap_or_else(|| "local".into())
            .to_lowercase()
            .as_str()
        {
            "local" => StoreBackend::Local,
            "remote" => {
                let url = env_opt("REMOTE_URL").ok_or_else(|| {
                    ServerError::Config("STORE_BACKEND=remote requires REMOTE_URL".into())
                })?;
                StoreBackend::Remote {
                    url,
                    api_key: env_opt("REMOTE_API_KEY").unwrap_or_default(),
                }
            }
            other => {
                return Err(ServerError::Config(format!(
                    "Unknown STORE_BACKEND '{other}' (expected local or remote)"
                )));
            }
        };

        let timezone = match env_opt("TIMEZONE") {
            Some(name) => parse_timezone(&name).unwrap_or_else(|| {
                tracing::warn!(timezone = %name, "Unknown TIMEZONE, falling back to UTC");
                Tz::UTC
            }),
            None => parse_timezone(DEFAULT_TIMEZONE).unwrap_or(Tz::UTC),
        };

        let label_locale = env_opt("LABEL_LOCALE")
            .and_then(|v| LabelLocale::parse(&v))
            .unwrap_or_default();

        let database_path = env_opt("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&work_dir).join("mostrador.redb"));

        Ok(Self {
            http_port: env_or("HTTP_PORT", 3000),
            environment: env_opt("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            log_level: env_opt("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: env_opt("LOG_DIR"),
            backend,
            database_path,
            timezone,
            label_locale,
            active_client_window_days: env_or("ACTIVE_CLIENT_WINDOW_DAYS", 30u32).max(1),
            top_products_window_days: env_or("TOP_PRODUCTS_WINDOW_DAYS", 30u32).max(1),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10_000),
            work_dir,
        })
    }

    /// Defaults without reading the environment (tests)
    pub fn for_tests(work_dir: impl Into<String>) -> Self {
        let work_dir = work_dir.into();
        Self {
            database_path: PathBuf::from(&work_dir).join("mostrador.redb"),
            work_dir,
            http_port: 0,
            environment: "test".into(),
            log_level: "debug".into(),
            log_dir: None,
            backend: StoreBackend::Local,
            timezone: parse_timezone(DEFAULT_TIMEZONE).unwrap_or(Tz::UTC),
            label_locale: LabelLocale::Es,
            active_client_window_days: 30,
            top_products_window_days: 30,
            request_timeout_ms: 30_000,
            shutdown_timeout_ms: 1_000,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
