use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const ENV_API_URL: &str = "BOOKSHELF_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "BOOKSHELF_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid BOOKSHELF_TIMEOUT_SECS value '{0}': expected whole seconds")]
    InvalidTimeout(String),
}

/// RESTクライアントの設定。起動時に一度だけ決まり、実行中は変わらない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: Url,
    /// Noneならタイムアウトなし
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            request_timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// 優先順位: CLI引数 → 環境変数 → デフォルト
    pub fn load(cli_url: Option<String>) -> Result<Self, ConfigError> {
        Self::resolve(
            cli_url,
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_TIMEOUT_SECS).ok(),
        )
    }

    fn resolve(
        cli_url: Option<String>,
        env_url: Option<String>,
        env_timeout: Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = cli_url
            .or(env_url)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self::new(&url)?;

        if let Some(raw) = env_timeout.filter(|t| !t.trim().is_empty()) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".into()));
    }
    Ok(url)
}
