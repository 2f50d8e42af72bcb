//! The request executor.
//!
//! [`ApiClient`] is the one type that knows how to perform an exchange. Its
//! definition stays closed: named operations such as `login` or `load_feed`
//! are attached from [`crate::capabilities`] through extension traits, so
//! adding one never touches this module.

pub mod request;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, default_base_url};
use crate::error::ClientError;
use crate::net::{HttpClient, Transport};

pub use request::{ApiRequest, ApiResponse};

/// How failed idempotent requests are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Base delay between attempts (exponential backoff: delay * 2^(attempt-1)).
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(250),
        }
    }
}

/// The shared request executor.
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("transport", &self.transport.name())
            .field("retry", &self.retry)
            .finish()
    }
}

impl ApiClient {
    /// Create a builder for configuring the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Build the production executor from the `[client]` config section.
    ///
    /// Never fails: an unparseable base URL is logged and replaced by the
    /// default one.
    pub fn from_config(config: &ClientConfig) -> Self {
        let base_url = match parse_base_url(&config.base_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(base_url = %config.base_url, error = %e, "Invalid base URL; using default");
                fallback_base_url()
            }
        };
        Self {
            base_url,
            transport: Arc::new(HttpClient::from_config(config)),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: config.retry_base_delay(),
            },
        }
    }

    /// Executor over an arbitrary transport, without retries.
    pub fn with_transport(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            transport,
            retry: RetryPolicy::none(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Resolve a request path and query against the base URL.
    pub fn resolve(&self, request: &ApiRequest) -> Result<Url, ClientError> {
        let mut url = self.base_url.join(request.path.trim_start_matches('/'))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    /// Perform one exchange.
    ///
    /// Non-2xx statuses come back as [`ClientError::Api`]. Idempotent requests
    /// are retried on retryable failures according to the [`RetryPolicy`].
    /// A non-retryable failure is returned as is; [`ClientError::RetriesExhausted`]
    /// only reports a retryable failure on the last allowed attempt.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.resolve(&request)?;
        let retries = if request.is_idempotent() {
            self.retry.max_retries
        } else {
            0
        };
        let attempts = retries + 1;
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.retry.delay_for(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            debug!(method = %request.method, url = %url, attempt, "Executing request");

            let result = self
                .transport
                .send(url.clone(), request.clone())
                .await
                .and_then(check_status);

            match result {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    warn!(method = %request.method, url = %url, error = %e, "Request failed, will retry");
                    last_error = Some(e);
                }
                Err(e) if !e.is_retryable() || attempts == 1 => {
                    warn!(method = %request.method, url = %url, error = %e, "Request failed");
                    return Err(e);
                }
                Err(e) => {
                    warn!(method = %request.method, url = %url, error = %e, attempts, "Request failed, no retries left");
                    last_error = Some(e);
                }
            }
        }

        Err(ClientError::RetriesExhausted {
            attempts,
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".into()),
        })
    }
}

fn check_status(response: ApiResponse) -> Result<ApiResponse, ClientError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Api {
            status: response.status,
            message: response.text(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(format!("'{raw}' cannot be a base URL")));
    }
    Ok(with_trailing_slash(url))
}

fn fallback_base_url() -> Url {
    Url::parse(&default_base_url()).expect("default base URL is valid")
}

/// `Url::join` replaces the last segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    retry: Option<RetryPolicy>,
}

impl ApiClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Replace the reqwest transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build the executor; fails only on an invalid base URL.
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = parse_base_url(&self.config.base_url)?;
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpClient::from_config(&self.config)));
        let retry = self.retry.unwrap_or(RetryPolicy {
            max_retries: self.config.max_retries,
            base_delay: self.config.retry_base_delay(),
        });
        Ok(ApiClient {
            base_url,
            transport,
            retry,
        })
    }
}
