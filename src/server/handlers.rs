use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::pipeline::{resolve_token, DescribeError, Pipeline, PipelineError};
use crate::upload;

/// Built once at startup and shared by every request.
pub struct AppState {
    pub pipeline: Pipeline,
    api_token: Option<String>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, api_token: Option<String>) -> Self {
        Self { pipeline, api_token }
    }

    pub fn has_stored_token(&self) -> bool {
        self.api_token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DescribeResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub processing_time_ms: u128,
}

impl DescribeResponse {
    fn failure(message: impl Into<String>, start: Instant) -> Self {
        Self {
            status: "failure".to_string(),
            message: Some(message.into()),
            processing_time_ms: start.elapsed().as_millis(),
            ..Default::default()
        }
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[derive(Default)]
struct UploadForm {
    image: Option<Vec<u8>>,
    token: Option<String>,
    translate: bool,
}

fn form_error(err: MultipartError) -> (StatusCode, String) {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        (status, upload::too_large_message())
    } else {
        (status, err.body_text())
    }
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, (StatusCode, String)> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let data = field.bytes().await.map_err(form_error)?;
                if data.len() > upload::MAX_UPLOAD_BYTES {
                    return Err((StatusCode::PAYLOAD_TOO_LARGE, upload::too_large_message()));
                }
                form.image = Some(data.to_vec());
            }
            "token" => {
                form.token = Some(field.text().await.map_err(form_error)?);
            }
            "translate" => {
                let value = field.text().await.map_err(form_error)?;
                form.translate = matches!(value.trim(), "true" | "on" | "1");
            }
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn reject(status: StatusCode, message: impl Into<String>, start: Instant) -> Response {
    (status, Json(DescribeResponse::failure(message, start))).into_response()
}

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let start = Instant::now();

    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err((status, message)) => {
            tracing::warn!(%status, %message, "rejected upload");
            return reject(status, message, start);
        }
    };

    let Some(raw) = form.image.filter(|data| !data.is_empty()) else {
        return reject(StatusCode::BAD_REQUEST, "No image uploaded", start);
    };

    let token = match resolve_token(form.token.as_deref(), state.api_token.as_deref()) {
        Ok(token) => token.to_string(),
        Err(e) => return reject(StatusCode::UNAUTHORIZED, e.to_string(), start),
    };

    let jpeg = match upload::to_rgb_jpeg(&raw) {
        Ok(jpeg) => jpeg,
        Err(e) => {
            tracing::warn!(error = %e, "could not decode uploaded image");
            let message = format!("Could not read image: {}", e);
            return reject(StatusCode::BAD_REQUEST, message, start);
        }
    };

    match state.pipeline.describe(jpeg, &token, form.translate).await {
        Ok(description) => (
            StatusCode::OK,
            Json(DescribeResponse {
                status: "success".to_string(),
                caption: Some(description.caption),
                translation: description.translation,
                processing_time_ms: start.elapsed().as_millis(),
                ..Default::default()
            }),
        )
            .into_response(),
        Err(e) => describe_error_response(e, start),
    }
}

/// A caption obtained before the failing stage is still returned.
fn describe_error_response(err: DescribeError, start: Instant) -> Response {
    let DescribeError { caption, error } = err;
    let stage = error.stage().map(str::to_string);
    let message = Some(error.to_string());
    let elapsed = start.elapsed().as_millis();

    let (status, body) = match error {
        PipelineError::MissingToken => (
            StatusCode::UNAUTHORIZED,
            DescribeResponse {
                status: "failure".to_string(),
                message,
                processing_time_ms: elapsed,
                ..Default::default()
            },
        ),
        PipelineError::Loading {
            retry_after_seconds,
            ..
        } => (
            StatusCode::SERVICE_UNAVAILABLE,
            DescribeResponse {
                status: "loading".to_string(),
                caption,
                retry_after_seconds: Some(retry_after_seconds),
                stage,
                message,
                processing_time_ms: elapsed,
                ..Default::default()
            },
        ),
        PipelineError::Failed { .. } | PipelineError::UnexpectedResponse { .. } => (
            StatusCode::BAD_GATEWAY,
            DescribeResponse {
                status: "failure".to_string(),
                caption,
                stage,
                message,
                processing_time_ms: elapsed,
                ..Default::default()
            },
        ),
    };

    (status, Json(body)).into_response()
}
