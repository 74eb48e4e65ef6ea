/// Client configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, no trailing slash (default: `http://localhost:8000`).
    pub base_url: String,
    /// Bearer token attached to every request, if set.
    pub auth_token: Option<String>,
    /// Per-request HTTP timeout in seconds (default: `30`). This bounds a
    /// single status query, not the overall polling duration -- that is
    /// the poll policy's job.
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `COPYDESK_BASE_URL`             | `http://localhost:8000` |
    /// | `COPYDESK_AUTH_TOKEN`           | unset                   |
    /// | `COPYDESK_REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Self {
        let base_url = std::env::var("COPYDESK_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".into())
            .trim_end_matches('/')
            .to_string();

        let auth_token = std::env::var("COPYDESK_AUTH_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        let request_timeout_secs: u64 = std::env::var("COPYDESK_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("COPYDESK_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            auth_token,
            request_timeout_secs,
        }
    }

    /// Config pointing at an explicit base URL, no auth. Used by tests
    /// and the probe binary's `--url` override.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            auth_token: None,
            request_timeout_secs: 30,
        }
    }
}
