//! Thin client for hosted inference endpoints.
//!
//! One POST per call, authenticated with a bearer token. The raw HTTP
//! response is folded into an [`InferenceResult`]; nothing is retried here.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

/// Marker the hosted API puts in `error` while a model is paged in.
pub const LOADING_MARKER: &str = "is currently loading";

/// Retry hint used when a loading response carries no `estimated_time`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 20;

/// Which hosted model a request is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Captioning,
    Translation,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Captioning => "captioning",
            Endpoint::Translation => "translation",
        }
    }
}

/// Request body, chosen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Opaque bytes, sent as-is.
    Binary(Vec<u8>),
    /// Serialized as JSON.
    Json(Value),
}

impl Payload {
    /// `{"inputs": text}`, the shape text models expect.
    pub fn inputs(text: &str) -> Self {
        Payload::Json(serde_json::json!({ "inputs": text }))
    }
}

pub struct InferenceRequest<'a> {
    pub endpoint: Endpoint,
    pub url: &'a str,
    pub payload: Payload,
    pub token: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The endpoint answered with something other than a usable success.
    Http,
    /// No usable response at all: DNS, connect, reset, timeout, body read.
    Transport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InferenceResult {
    Success {
        body: Value,
    },
    Loading {
        retry_after_seconds: u64,
    },
    Failure {
        message: String,
        status_code: Option<u16>,
        kind: FailureKind,
    },
}

impl InferenceResult {
    fn http_failure(status: u16, message: String) -> Self {
        InferenceResult::Failure {
            message,
            status_code: Some(status),
            kind: FailureKind::Http,
        }
    }

    fn transport_failure(err: &reqwest::Error) -> Self {
        let cause = if err.is_timeout() {
            "timed out"
        } else if err.is_connect() {
            "connection failed"
        } else {
            "transport error"
        };

        InferenceResult::Failure {
            message: format!("Request failed ({}): {}", cause, err),
            status_code: None,
            kind: FailureKind::Transport,
        }
    }
}

/// Turns a status code and raw body into an outcome.
///
/// * 200 with JSON: `Success` holding the decoded value untouched.
/// * non-200 whose `error` mentions the loading marker: `Loading`, with
///   `estimated_time` truncated to whole seconds (20 when absent).
/// * any other non-200: `Failure` naming the `error` text, or the raw body
///   when it is not JSON, together with the status code.
pub fn classify(status: u16, body: &str) -> InferenceResult {
    let decoded = serde_json::from_str::<Value>(body);

    if status == 200 {
        return match decoded {
            Ok(body) => InferenceResult::Success { body },
            Err(_) => InferenceResult::http_failure(
                status,
                format!("API error {}: response was not valid JSON: {}", status, body),
            ),
        };
    }

    let value = match decoded {
        Ok(value) => value,
        Err(_) => {
            let message = format!("API error {}: {}", status, body);
            return InferenceResult::http_failure(status, message);
        }
    };

    let error = match value.get("error") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };

    match error {
        Some(error) if error.contains(LOADING_MARKER) => InferenceResult::Loading {
            retry_after_seconds: retry_after(&value),
        },
        Some(error) => {
            InferenceResult::http_failure(status, format!("API error {}: {}", status, error))
        }
        None => {
            InferenceResult::http_failure(status, format!("API error {}: Unknown error", status))
        }
    }
}

// `as` truncates toward zero and saturates, so negatives become 0.
fn retry_after(value: &Value) -> u64 {
    value
        .get("estimated_time")
        .and_then(Value::as_f64)
        .map(|secs| secs as u64)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// HTTP client shared by every request of the process.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
}

impl InferenceClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    pub async fn send(&self, request: InferenceRequest<'_>) -> InferenceResult {
        let builder = self
            .http
            .post(request.url)
            .header(AUTHORIZATION, format!("Bearer {}", request.token));

        let builder = match request.payload {
            Payload::Binary(bytes) => builder
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(bytes),
            Payload::Json(value) => builder.json(&value),
        };

        let endpoint = request.endpoint.as_str();
        tracing::debug!(endpoint, url = request.url, "sending inference request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "inference request failed");
                return InferenceResult::transport_failure(&e);
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(endpoint, status, error = %e, "failed to read response body");
                return InferenceResult::transport_failure(&e);
            }
        };

        tracing::debug!(
            endpoint,
            status,
            body = &text[..floor_char_boundary(&text, 500)],
            "inference response"
        );

        let result = classify(status, &text);
        match &result {
            InferenceResult::Success { .. } => {}
            InferenceResult::Loading { retry_after_seconds } => {
                tracing::info!(endpoint, retry_after_seconds, "model is loading")
            }
            InferenceResult::Failure { message, .. } => {
                tracing::warn!(endpoint, status, %message, "inference failed")
            }
        }
        result
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
