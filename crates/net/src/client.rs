//! HTTP client with connection pooling and retry logic

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use sov_errors::{Error, NetworkError};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120), // generation on a laptop GPU is slow
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 4,
            retry_count: 2,
            retry_delay: Duration::from_secs(1),
            user_agent: format!("sovereign/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Which failures a request may be retried on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryPolicy {
    /// Timeouts, connection failures and 5xx responses
    Idempotent,
    /// Only failures to connect; the server never saw the request
    ConnectOnly,
}

impl RetryPolicy {
    fn retries_error(self, error: &reqwest::Error) -> bool {
        match self {
            Self::Idempotent => {
                error.is_timeout()
                    || error.is_connect()
                    || error.status().is_some_and(|s| s.is_server_error())
            }
            Self::ConnectOnly => error.is_connect(),
        }
    }

    fn retries_status(self, status: StatusCode) -> bool {
        self == Self::Idempotent && status.is_server_error()
    }
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created due to invalid configuration
    /// or if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Execute an authenticated GET request with retries
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts, including
    /// network timeouts, connection failures, or server errors.
    pub async fn get(&self, url: &str, bearer: Option<&str>) -> Result<Response, Error> {
        self.retry_request(RetryPolicy::Idempotent, || {
            let mut request = self.client.get(url);
            if let Some(token) = bearer {
                request = request.bearer_auth(token);
            }
            request.send()
        })
        .await
    }

    /// Execute an authenticated POST with a JSON body
    ///
    /// A POST is not assumed to be idempotent: it is only retried when the
    /// connection could not be established. Timeouts and 5xx responses are
    /// reported on the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, on connection failures once retries are
    /// exhausted, or if the request cannot be sent.
    pub async fn post_json<B>(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<Response, Error>
    where
        B: Serialize + ?Sized,
    {
        self.retry_request(RetryPolicy::ConnectOnly, || {
            let mut request = self.client.post(url).json(body);
            if let Some(token) = bearer {
                request = request.bearer_auth(token);
            }
            request.send()
        })
        .await
    }

    /// Execute a request with retries
    ///
    /// Failures allowed by `policy` are retried with linear backoff. A 5xx
    /// response that is not retried is handed back so the caller can report it.
    async fn retry_request<F, Fut>(&self, policy: RetryPolicy, mut f: F) -> Result<Response, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_count {
            if attempt > 0 {
                tracing::debug!(attempt, "retrying request");
                tokio::time::sleep(self.config.retry_delay * attempt).await;
            }

            match f().await {
                Ok(response) => {
                    // Check for rate limiting
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(retry_after) = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                        {
                            return Err(NetworkError::RateLimited {
                                seconds: retry_after,
                            }
                            .into());
                        }
                    }

                    if policy.retries_status(response.status()) && attempt < self.config.retry_count {
                        tracing::debug!(status = %response.status(), "server error");
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    let retry = policy.retries_error(&e);
                    last_error = Some(e);

                    // Don't retry on certain errors
                    if !retry {
                        break;
                    }
                }
            }
        }

        // Convert the last error
        match last_error {
            Some(e) if e.is_timeout() => Err(NetworkError::Timeout {
                url: e
                    .url()
                    .map(std::string::ToString::to_string)
                    .unwrap_or_default(),
            }
            .into()),
            Some(e) if e.is_connect() => Err(NetworkError::ConnectionRefused(e.to_string()).into()),
            Some(e) => Err(NetworkError::RequestFailed(e.to_string()).into()),
            None => Err(NetworkError::RequestFailed("Unknown error".to_string()).into()),
        }
    }
}
