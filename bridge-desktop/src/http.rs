//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("session-gate/", env!("CARGO_PKG_VERSION"));

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest
/// - Automatic retry with exponential backoff on 5xx and 429
/// - TLS via rustls
///
/// Responses with other statuses are returned as-is. A retryable status
/// that persists through every attempt is reported as
/// [`BridgeError::NotAvailable`], the same as a connection failure.
pub struct ReqwestHttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP client with a per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self::with_client(client))
    }

    /// Wrap an already configured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
        }
    }

    /// Retry policy used by [`HttpClient::execute`]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn convert_error(e: reqwest::Error, timeout: Option<Duration>) -> BridgeError {
        if e.is_timeout() {
            BridgeError::Timeout(timeout.map(|t| t.as_millis() as u64).unwrap_or_default())
        } else if e.is_connect() {
            BridgeError::NotAvailable(format!("Connection failed: {}", e))
        } else {
            BridgeError::OperationFailed(e.to_string())
        }
    }

    async fn execute_with_retry_internal(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!(
                attempt,
                max_attempts,
                url = %request.url,
                "Executing HTTP request"
            );

            match self.build_request(request.clone()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if status >= 500 || status == 429 {
                        warn!(status, attempt, "HTTP request failed with retryable status");
                        last_error = Some(BridgeError::NotAvailable(format!(
                            "HTTP {} from {}",
                            status, request.url
                        )));
                    } else {
                        let headers: HashMap<String, String> = response
                            .headers()
                            .iter()
                            .filter_map(|(k, v)| {
                                v.to_str().ok().map(|s| (k.to_string(), s.to_string()))
                            })
                            .collect();

                        let body = response
                            .bytes()
                            .await
                            .map_err(|e| Self::convert_error(e, request.timeout))?;

                        return Ok(HttpResponse {
                            status,
                            headers,
                            body,
                        });
                    }
                }
                Err(e) => {
                    warn!(error = %e, attempt, "HTTP request failed");
                    last_error = Some(Self::convert_error(e, request.timeout));
                }
            }

            if attempt < max_attempts {
                let delay = policy.delay_for(attempt);
                debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
                sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BridgeError::OperationFailed("All retry attempts exhausted".to_string())
        }))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry_internal(request, self.policy.clone())
            .await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        self.execute_with_retry_internal(request, policy).await
    }
}
