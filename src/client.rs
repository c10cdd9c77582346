//! HTTP clients
//!
//! `BackendClient` talks to the ML backend (crop classifier, yield regressor,
//! land allocator). `PlansClient` talks to this crate's own relay server.
//! Both classify failures into an `ApiError` whose `user_message` can be shown
//! as-is. There is no retry: a failed call surfaces immediately.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    AllocationRequest, AllocationResult, CropPrediction, FarmConditions, FarmPlanInput,
    FarmPlanRecord, FarmPlanResult, YieldPrediction, YieldRequest,
};

/// Model inference can be slow.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

// ============================================================================
// Error Classification
// ============================================================================

/// How a user-facing message is chosen for a status code.
#[derive(Debug, Clone, Copy)]
enum StatusMessage {
    /// Backend `detail` when present, otherwise the fixed text
    DetailOr(&'static str),
    /// Always the fixed text, whatever the body says
    Fixed(&'static str),
}

const STATUS_MESSAGES: &[(u16, StatusMessage)] = &[
    (400, StatusMessage::DetailOr("Invalid input. Please check your farm details.")),
    (404, StatusMessage::Fixed("Requested resource not found.")),
    (422, StatusMessage::Fixed("Validation error. Some fields are missing or incorrect.")),
    (500, StatusMessage::Fixed("Server error. The model or backend is unavailable.")),
];

pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

/// Map a failed call to the message shown to the user.
///
/// Known statuses use the table; anything else falls back to the backend's
/// `detail`, then the raw error text, then a generic message.
pub fn user_message(status: Option<u16>, detail: Option<&str>, raw: Option<&str>) -> String {
    let known = status.and_then(|code| {
        STATUS_MESSAGES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, message)| *message)
    });

    match known {
        Some(StatusMessage::DetailOr(text)) => detail.unwrap_or(text).to_string(),
        Some(StatusMessage::Fixed(text)) => text.to_string(),
        None => detail.or(raw).unwrap_or(FALLBACK_MESSAGE).to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Non-2xx response
    Status,
    /// Request exceeded the client timeout
    Timeout,
    /// Connection could not be established or was dropped
    Transport,
    /// 2xx response whose body did not decode
    Decode,
}

/// A classified request failure.
#[derive(Debug, Clone, Error)]
#[error("{user_message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    /// Message fit for direct display
    pub user_message: String,
    /// Underlying error text ("Request failed with status code 500", ...)
    pub raw: String,
}

impl ApiError {
    /// Classify a non-2xx response. `detail_field` names the body field that
    /// carries the server's explanation.
    fn from_response(status: StatusCode, body: &str, detail_field: &str) -> Self {
        let code = status.as_u16();
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get(detail_field).cloned())
            .filter(|d| !d.is_null())
            .map(|d| match d {
                Value::String(s) => s,
                other => other.to_string(),
            });
        let raw = format!("Request failed with status code {}", code);
        Self {
            kind: ApiErrorKind::Status,
            status: Some(code),
            user_message: user_message(Some(code), detail.as_deref(), Some(&raw)),
            raw,
        }
    }

    fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        let (kind, raw) = if err.is_timeout() {
            (
                ApiErrorKind::Timeout,
                format!("timeout of {}ms exceeded", timeout.as_millis()),
            )
        } else {
            (ApiErrorKind::Transport, err.to_string())
        };
        Self {
            kind,
            status: err.status().map(|s| s.as_u16()),
            user_message: user_message(None, None, Some(&raw)),
            raw,
        }
    }

    fn from_decode(err: serde_json::Error) -> Self {
        let raw = format!("Unexpected response from server: {}", err);
        Self {
            kind: ApiErrorKind::Decode,
            status: None,
            user_message: user_message(None, None, Some(&raw)),
            raw,
        }
    }

    fn log(&self) {
        match self.status {
            Some(code) => tracing::error!("[API Error {}] {}", code, self.user_message),
            None => tracing::error!("[API Error] {}", self.user_message),
        }
    }
}

// ============================================================================
// Shared Transport
// ============================================================================

#[derive(Clone)]
struct JsonHttp {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    /// Body field holding the server's error explanation
    detail_field: &'static str,
}

impl JsonHttp {
    fn new(base_url: &str, timeout: Duration, detail_field: &'static str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::from_transport(e, timeout))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            detail_field,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, self.timeout))
            .inspect_err(ApiError::log)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(e, self.timeout))
            .inspect_err(ApiError::log)?;

        if !status.is_success() {
            let err = ApiError::from_response(status, &body, self.detail_field);
            err.log();
            return Err(err);
        }

        serde_json::from_str(&body)
            .map_err(ApiError::from_decode)
            .inspect_err(ApiError::log)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        self.send(self.http.post(url).json(body)).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        self.send(self.http.get(url)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("DELETE {}", url);
        self.send(self.http.delete(url)).await
    }
}

// ============================================================================
// ML Backend Client
// ============================================================================

/// Client for the external ML backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: JsonHttp,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            inner: JsonHttp::new(base_url, timeout, "detail")?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Crop prediction, land allocation and environment analysis in one call.
    pub async fn generate_farm_plan(&self, input: &FarmPlanInput) -> Result<FarmPlanResult, ApiError> {
        self.inner.post("/generate-farm-plan", input).await
    }

    pub async fn predict_crop(&self, conditions: &FarmConditions) -> Result<CropPrediction, ApiError> {
        self.inner.post("/predict-crop", conditions).await
    }

    pub async fn predict_yield(&self, request: &YieldRequest) -> Result<YieldPrediction, ApiError> {
        self.inner.post("/predict-yield", request).await
    }

    pub async fn optimize_allocation(&self, request: &AllocationRequest) -> Result<AllocationResult, ApiError> {
        self.inner.post("/optimize-allocation", request).await
    }

    /// Post an arbitrary JSON body and return the decoded JSON response untouched.
    pub async fn forward(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.inner.post(path, body).await
    }
}

// ============================================================================
// Relay Server Client
// ============================================================================

/// Client for the plan relay server (`/api/plans`).
#[derive(Clone)]
pub struct PlansClient {
    inner: JsonHttp,
}

impl PlansClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            inner: JsonHttp::new(base_url, REQUEST_TIMEOUT, "details")?,
        })
    }

    /// Generate through the relay and persist. `request` is forwarded verbatim.
    pub async fn generate(&self, request: &Value) -> Result<FarmPlanRecord, ApiError> {
        self.inner.post("/api/plans/generate", request).await
    }

    pub async fn list(&self) -> Result<Vec<FarmPlanRecord>, ApiError> {
        self.inner.get("/api/plans").await
    }

    pub async fn get(&self, id: Uuid) -> Result<FarmPlanRecord, ApiError> {
        self.inner.get(&format!("/api/plans/{}", id)).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<String, ApiError> {
        let body: Value = self.inner.delete(&format!("/api/plans/{}", id)).await?;
        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}
