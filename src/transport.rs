use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{multipart::Form, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{ApiError, ApiResult};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pins response field shapes across server upgrades.
pub const ACCEPT_VERSION: &str = "application/json; version=5";

pub enum Payload {
    Empty,
    Json(Vec<u8>),
    Multipart(Form),
}

impl Payload {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> ApiResult<Self> {
        Ok(Self::Json(serde_json::to_vec(value)?))
    }
}

/// A fully read response. The body is drained before this is handed out, so
/// the connection goes back to the pool no matter how the caller exits.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Passes the response through when its status is one of `accepted`.
    pub fn expect_status(self, accepted: &[StatusCode]) -> ApiResult<Self> {
        if accepted.contains(&self.status) {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }

    pub fn into_error(self) -> ApiError {
        let body = self.text();
        ApiError::from_response(self.status, body)
    }
}

#[derive(Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    token: String,
}

impl Transport {
    pub fn new(base_url: &str, token: &str) -> ApiResult<Self> {
        Self::with_timeout(base_url, token, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, token: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> ApiResult<RawResponse> {
        let url = join_url(&self.base_url, path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(ACCEPT, HeaderValue::from_static(ACCEPT_VERSION));

        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.header(CONTENT_TYPE, "application/json").body(body),
            Payload::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(%method, %url, %status, bytes = body.len(), "api request completed");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn get(&self, path: &str) -> ApiResult<RawResponse> {
        self.execute(Method::GET, path, Payload::Empty).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> ApiResult<RawResponse> {
        self.execute(Method::POST, path, Payload::json(body)?).await
    }

    pub async fn patch<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> ApiResult<RawResponse> {
        self.execute(Method::PATCH, path, Payload::json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<RawResponse> {
        self.execute(Method::DELETE, path, Payload::Empty).await
    }
}

fn normalize_base_url(raw: &str) -> ApiResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

/// Joins a base URL and an API path with exactly one slash between them.
/// Absolute URLs (such as pagination cursors) are used unchanged.
pub fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
