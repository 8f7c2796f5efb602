//! Connection settings for a Bitbucket Server instance.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::InsightsError;

/// Environment variable for the Bitbucket Server base URL.
pub const ENV_BITBUCKET_URL: &str = "BITBUCKET_URL";

/// Environment variable for the personal access token.
pub const ENV_BITBUCKET_TOKEN: &str = "BITBUCKET_TOKEN";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Base URL and access token of one Bitbucket Server instance.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConnection {
    url: String,
    token: String,
}

impl ServerConnection {
    /// Create a connection from a base URL and bearer token.
    ///
    /// A trailing `/` on the URL is dropped so paths can be appended directly.
    ///
    /// # Errors
    /// Returns [`InsightsError::Config`] if either value is blank.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self, InsightsError> {
        let url = url.into();
        let token = token.into();

        let url = url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(InsightsError::Config("Bitbucket URL is empty".to_string()));
        }
        if token.trim().is_empty() {
            return Err(InsightsError::Config(
                "Bitbucket access token is empty".to_string(),
            ));
        }

        Ok(Self { url, token })
    }

    /// Read the connection from `BITBUCKET_URL` and `BITBUCKET_TOKEN`.
    ///
    /// # Errors
    /// Returns [`InsightsError::Config`] if a variable is unset or blank.
    pub fn from_env() -> Result<Self, InsightsError> {
        let url = std::env::var(ENV_BITBUCKET_URL)
            .map_err(|_| InsightsError::Config(format!("{ENV_BITBUCKET_URL} not set")))?;
        let token = std::env::var(ENV_BITBUCKET_TOKEN)
            .map_err(|_| InsightsError::Config(format!("{ENV_BITBUCKET_TOKEN} not set")))?;

        debug!(url = %url, "Loaded Bitbucket connection from environment");
        Self::new(url, token)
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Bearer access token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for ServerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConnection")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Transport options for [`crate::InsightsClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("insights/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_trailing_slash_trimmed() {
        let conn = ServerConnection::new("https://scm.example.com/", "abc").unwrap();
        assert_eq!(conn.url(), "https://scm.example.com");
        assert_eq!(conn.token(), "abc");
    }

    #[test]
    fn test_blank_values_rejected() {
        assert!(matches!(
            ServerConnection::new("  ", "abc"),
            Err(InsightsError::Config(_))
        ));
        assert!(matches!(
            ServerConnection::new("https://scm.example.com", ""),
            Err(InsightsError::Config(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let conn = ServerConnection::new("https://scm.example.com", "s3cret").unwrap();
        let rendered = format!("{conn:?}");
        assert!(rendered.contains("scm.example.com"));
        assert!(!rendered.contains("s3cret"));
    }

    fn clear_env() {
        std::env::remove_var(ENV_BITBUCKET_URL);
        std::env::remove_var(ENV_BITBUCKET_TOKEN);
    }

    #[test]
    #[serial]
    fn test_from_env_reads_both_variables() {
        std::env::set_var(ENV_BITBUCKET_URL, "https://bitbucket.example.com/");
        std::env::set_var(ENV_BITBUCKET_TOKEN, "env-token");

        let conn = ServerConnection::from_env();
        clear_env();

        let conn = conn.expect("connection from env");
        assert_eq!(conn.url(), "https://bitbucket.example.com");
        assert_eq!(conn.token(), "env-token");
    }

    #[test]
    #[serial]
    fn test_from_env_unset_variables() {
        clear_env();
        std::env::set_var(ENV_BITBUCKET_TOKEN, "env-token");

        let missing_url = ServerConnection::from_env();
        clear_env();
        std::env::set_var(ENV_BITBUCKET_URL, "https://bitbucket.example.com");

        let missing_token = ServerConnection::from_env();
        clear_env();

        match missing_url {
            Err(InsightsError::Config(msg)) => assert!(msg.contains(ENV_BITBUCKET_URL)),
            other => panic!("expected config error, got {other:?}"),
        }
        match missing_token {
            Err(InsightsError::Config(msg)) => assert!(msg.contains(ENV_BITBUCKET_TOKEN)),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_from_env_blank_variables() {
        std::env::set_var(ENV_BITBUCKET_URL, "https://bitbucket.example.com");
        std::env::set_var(ENV_BITBUCKET_TOKEN, "   ");

        let blank_token = ServerConnection::from_env();
        std::env::set_var(ENV_BITBUCKET_URL, "");
        std::env::set_var(ENV_BITBUCKET_TOKEN, "env-token");

        let blank_url = ServerConnection::from_env();
        clear_env();

        assert!(matches!(blank_token, Err(InsightsError::Config(_))));
        assert!(matches!(blank_url, Err(InsightsError::Config(_))));
    }

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert!(options.user_agent.starts_with("insights/"));
    }
}
