//! JSON-over-HTTP helpers with one timeout policy and one error shape.
//!
//! Every call takes [`RequestOptions`]: an optional bearer token and an
//! optional [`CancellationToken`]. Cancelling the token resolves the call with
//! [`ApiError::Aborted`], never with a generic network error.

use crate::APP_USER_AGENT;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{future::Future, time::Duration};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

/// Timeout applied to every outbound request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;
const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        errors: Vec<String>,
    },
    #[error("Request aborted")]
    Aborted,
    #[error("Request timed out")]
    Timeout,
    #[error("Network error")]
    Network(#[source] reqwest::Error),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Invalid request: {0}")]
    Request(String),
    #[error("Invalid id")]
    InvalidId,
}

impl ApiError {
    /// HTTP status of the failure, `0` when no response was received.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Http { status, .. } => *status,
            _ => 0,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

/// Envelope used by the data backend for every resource call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub status_code: u16,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RequestOptions<'a> {
    pub bearer: Option<&'a str>,
    pub cancel: Option<&'a CancellationToken>,
}

impl<'a> RequestOptions<'a> {
    #[must_use]
    pub fn bearer(mut self, token: Option<&'a str>) -> Self {
        self.bearer = token;
        self
    }

    #[must_use]
    pub fn cancel(mut self, cancel: Option<&'a CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url` with the default timeout and user agent.
    ///
    /// # Errors
    /// Returns an error if the URL is not absolute or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| ApiError::Request(format!("failed to build HTTP client: {err}")))?;
        Self::with_client(http, base_url)
    }

    /// # Errors
    /// Returns an error if the URL is not absolute.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim();
        Url::parse(base_url)
            .map_err(|err| ApiError::Request(format!("invalid base URL {base_url}: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim().trim_start_matches('/'))
    }

    /// Send a request and hand back the status and JSON body without judging
    /// the status. Empty or non-JSON bodies come back as `Value::Null`.
    ///
    /// # Errors
    /// Returns an error when no response arrives (network, timeout, abort).
    #[instrument(skip(self, body, options), fields(base = %self.base_url))]
    pub async fn send_raw<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions<'_>,
    ) -> Result<(StatusCode, Value), ApiError> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(token) = options.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let exchange = async move {
            let response = request.send().await.map_err(ApiError::from_reqwest)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(ApiError::from_reqwest)?;
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            debug!("{path} -> {status}");
            Ok((status, value))
        };

        with_cancel(options.cancel, exchange).await
    }

    /// Send a request and decode a successful JSON body into `T`.
    ///
    /// # Errors
    /// Non-2xx responses become [`ApiError::Http`] carrying the server message.
    pub async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions<'_>,
    ) -> Result<T, ApiError> {
        let (status, value) = self.send_raw(method, path, body, options).await?;
        if !status.is_success() {
            return Err(http_error(status, &value));
        }
        serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions<'_>,
    ) -> Result<T, ApiError> {
        self.send::<(), T>(Method::GET, path, None, options).await
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions<'_>,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, Some(body), options).await
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions<'_>,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, Some(body), options).await
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions<'_>,
    ) -> Result<T, ApiError> {
        self.send::<(), T>(Method::DELETE, path, None, options).await
    }
}

/// Race `exchange` against the cancellation token, if one was given.
async fn with_cancel<T>(
    cancel: Option<&CancellationToken>,
    exchange: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    match cancel {
        Some(cancel) => {
            tokio::select! {
                biased;
                () = cancel.cancelled() => Err(ApiError::Aborted),
                result = exchange => result,
            }
        }
        None => exchange.await,
    }
}

/// Server-supplied `message`, or `default` when the body has none.
pub(crate) fn message_or(body: &Value, default: &str) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map_or_else(
            || default.to_string(),
            |message| message.chars().take(MAX_ERROR_CHARS).collect(),
        )
}

fn http_error(status: StatusCode, body: &Value) -> ApiError {
    let errors = body
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    ApiError::Http {
        status: status.as_u16(),
        message: message_or(body, DEFAULT_ERROR_MESSAGE),
        errors,
    }
}
