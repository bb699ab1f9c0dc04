// src/utils/http.rs
use std::time::Duration;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{LeakerError, LeakerResult};

/// Transport settings shared by every provider during one target's run
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
    pub insecure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: default_user_agent(),
            proxy: None,
            insecure: false,
        }
    }
}

pub fn default_user_agent() -> String {
    format!("leaker/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse a proxy URL into the proxy every session will use.
///
/// Proxies are rejected rather than ignored so traffic never silently
/// bypasses them. Setup and [`Session::new`] both go through here, so they
/// accept exactly the same schemes (http, https, socks5, socks5h).
pub fn validate_proxy(proxy: &str) -> LeakerResult<reqwest::Proxy> {
    let url = Url::parse(proxy).map_err(|e| LeakerError::InvalidProxy(format!("{}: {}", proxy, e)))?;

    if url.host_str().is_none() {
        return Err(LeakerError::InvalidProxy(proxy.to_string()));
    }

    reqwest::Proxy::all(url.as_str()).map_err(|e| LeakerError::InvalidProxy(format!("{}: {}", proxy, e)))
}

/// Pooled HTTP client handed read-only to providers.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct Session {
    client: Client,
}

/// Fully read response: status plus body text
#[derive(Debug)]
pub struct SessionResponse {
    pub status: StatusCode,
    pub body: String,
}

impl Session {
    /// Build a new session from transport settings
    pub fn new(config: &SessionConfig) -> LeakerResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(100)
            .danger_accept_invalid_certs(config.insecure);

        if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.proxy(validate_proxy(proxy)?);
        }

        let client = builder.build()?;

        Ok(Self { client })
    }

    /// Start a GET request
    pub fn get(&self, url: impl reqwest::IntoUrl) -> RequestBuilder {
        self.client.get(url)
    }

    /// Start a POST request
    pub fn post(&self, url: impl reqwest::IntoUrl) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a request and read the whole body
    pub async fn execute(&self, source_name: &str, request: RequestBuilder) -> LeakerResult<SessionResponse> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(
            "Response from {} source: status code [{}], size [{}]",
            source_name,
            status.as_u16(),
            body.len()
        );

        Ok(SessionResponse { status, body })
    }

    /// Release pooled connections.
    ///
    /// The pool is freed once the last clone held by a provider task is dropped.
    pub fn close(self) {
        drop(self.client);
    }
}

impl SessionResponse {
    /// Turn a non-200 status into a provider error carrying the body
    pub fn ensure_ok(self, source_name: &str) -> LeakerResult<Self> {
        if self.status != StatusCode::OK {
            return Err(LeakerError::UpstreamStatus {
                source_name: source_name.to_string(),
                status: self.status.as_u16(),
                body: self.body,
            });
        }
        Ok(self)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> LeakerResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_proxy() {
        assert!(validate_proxy("http://127.0.0.1:8080").is_ok());
        assert!(validate_proxy("socks5://proxy.local:1080").is_ok());
        assert!(matches!(validate_proxy("not a url"), Err(LeakerError::InvalidProxy(_))));
        assert!(matches!(validate_proxy("mailto:someone"), Err(LeakerError::InvalidProxy(_))));
        assert!(matches!(validate_proxy("ftp://proxy.local:21"), Err(LeakerError::InvalidProxy(_))));
    }

    #[tokio::test]
    async fn test_session_accepts_every_validated_proxy() {
        for proxy in ["http://127.0.0.1:8080", "https://proxy.local:8443", "socks5://127.0.0.1:1080"] {
            assert!(validate_proxy(proxy).is_ok());

            let config = SessionConfig {
                proxy: Some(proxy.to_string()),
                ..SessionConfig::default()
            };
            assert!(Session::new(&config).is_ok(), "session rejected {}", proxy);
        }
    }

    #[test]
    fn test_session_rejects_bad_proxy() {
        let config = SessionConfig {
            proxy: Some("::::".to_string()),
            ..SessionConfig::default()
        };

        assert!(matches!(Session::new(&config), Err(LeakerError::InvalidProxy(_))));
    }

    #[tokio::test]
    async fn test_session_builds_with_defaults() {
        let session = Session::new(&SessionConfig::default()).unwrap();
        session.close();
    }

    #[test]
    fn test_ensure_ok_maps_status() {
        let response = SessionResponse {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "slow down".to_string(),
        };

        let err = response.ensure_ok("dehashed").unwrap_err();
        assert_eq!(err.to_string(), "dehashed returned status 429: slow down");
    }
}
