//! Environment-driven server configuration, parsed once at startup.

/// Development fallback for the shared secret. Startup warns when it is in
/// use so it never survives into production unnoticed.
pub const DEFAULT_API_KEY: &str = "dev-key-change-in-production";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Shared secret expected in the `X-API-Key` header.
    pub api_key: String,
    pub allowed_origins: Vec<String>,
    /// When set, execution requests are forwarded to this remote service
    /// instead of the in-process engine.
    pub remote_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: DEFAULT_API_KEY.to_string(),
            allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
            remote_url: None,
        }
    }
}

impl ServerConfig {
    /// Read `PORT`, `EXECUTION_API_KEY`, `ALLOWED_ORIGINS`, and
    /// `EXECUTION_SERVICE_URL` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let api_key = std::env::var("EXECUTION_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string());
        let allowed_origins = parse_origins(
            &std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
        );
        let remote_url = std::env::var("EXECUTION_SERVICE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty());
        Self {
            port,
            api_key,
            allowed_origins,
            remote_url,
        }
    }

    #[must_use]
    pub fn uses_default_api_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }
}

/// Split a comma-separated origin list, dropping empty entries.
#[must_use]
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
