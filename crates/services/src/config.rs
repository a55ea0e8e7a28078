use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const API_URL_VAR: &str = "TRIVIA_API_URL";
pub const API_TIMEOUT_VAR: &str = "TRIVIA_API_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the trivia backend lives and how long any single call may take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
}

impl ApiConfig {
    /// Validate a base URL. Endpoints live under `<base>/api/`; the `api/` segment is
    /// always appended, so pass the server root, not the API root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the URL is blank, unparsable, or not http(s).
    pub fn new(raw: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                raw: format!("{}", timeout.as_secs()),
            });
        }

        let invalid = |reason: String| ConfigError::InvalidApiUrl {
            raw: trimmed.to_string(),
            reason,
        };
        let mut url = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base".to_string()));
        }
        url.set_query(None);
        url.set_fragment(None);

        let path = format!("{}/api/", url.path().trim_end_matches('/'));
        url.set_path(&path);

        Ok(Self {
            base_url: url,
            timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve an endpoint path relative to the `api/` root.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `path` does not form a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}

/// Parse a whole number of seconds greater than zero.
///
/// # Errors
///
/// Returns `ConfigError::InvalidTimeout` otherwise.
pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            raw: raw.to_string(),
        }),
    }
}
