//! Caption an image, then optionally translate the caption.

use serde_json::Value;
use thiserror::Error;

use crate::client::{
    Endpoint, FailureKind, InferenceClient, InferenceRequest, InferenceResult, Payload,
};
use crate::config::{self, Config};

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("No API token configured. Set HF_API_TOKEN or enter a token to continue.")]
    MissingToken,

    #[error("{endpoint} model is loading, please retry in {retry_after_seconds} seconds")]
    Loading {
        endpoint: &'static str,
        retry_after_seconds: u64,
    },

    #[error("{endpoint} request failed: {message}")]
    Failed {
        endpoint: &'static str,
        message: String,
        status_code: Option<u16>,
        kind: FailureKind,
    },

    #[error("{endpoint} returned an unexpected response: {body}")]
    UnexpectedResponse { endpoint: &'static str, body: String },
}

impl PipelineError {
    /// Stage that stopped the pipeline, if a request was made.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            PipelineError::MissingToken => None,
            PipelineError::Loading { endpoint, .. }
            | PipelineError::Failed { endpoint, .. }
            | PipelineError::UnexpectedResponse { endpoint, .. } => Some(endpoint),
        }
    }
}

/// A stopped pipeline, with the caption when captioning got that far.
#[derive(Debug, Error, PartialEq)]
#[error("{error}")]
pub struct DescribeError {
    pub caption: Option<String>,
    pub error: PipelineError,
}

impl From<PipelineError> for DescribeError {
    fn from(error: PipelineError) -> Self {
        Self {
            caption: None,
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub caption: String,
    pub translation: Option<String>,
}

/// Picks the user-entered token over the stored one. Blank counts as absent.
pub fn resolve_token<'a>(
    entered: Option<&'a str>,
    stored: Option<&'a str>,
) -> Result<&'a str, PipelineError> {
    entered
        .filter(|t| !t.trim().is_empty())
        .or(stored.filter(|t| !t.trim().is_empty()))
        .map(str::trim)
        .ok_or(PipelineError::MissingToken)
}

/// Reads `field` from an array's first object, or from the object itself.
pub fn project_text(body: &Value, field: &str) -> Option<String> {
    let item = match body {
        Value::Array(items) => items.first()?,
        other => other,
    };
    item.get(field)?.as_str().map(str::to_string)
}

pub struct Pipeline {
    client: InferenceClient,
    caption_url: String,
    translation_url: String,
}

impl Pipeline {
    pub fn new(client: InferenceClient, config: &Config) -> Self {
        tracing::info!(
            caption_url = %config.caption_url,
            translation_url = %config.translation_url,
            caption_max_length = config::CAPTION_MAX_LENGTH,
            caption_num_beams = config::CAPTION_NUM_BEAMS,
            translation_max_length = config::TRANSLATION_MAX_LENGTH,
            "inference pipeline ready"
        );
        Self {
            client,
            caption_url: config.caption_url.clone(),
            translation_url: config.translation_url.clone(),
        }
    }

    pub async fn caption(&self, image: Vec<u8>, token: &str) -> Result<String, PipelineError> {
        self.call(
            Endpoint::Captioning,
            &self.caption_url,
            Payload::Binary(image),
            token,
            "generated_text",
        )
        .await
    }

    pub async fn translate(&self, text: &str, token: &str) -> Result<String, PipelineError> {
        self.call(
            Endpoint::Translation,
            &self.translation_url,
            Payload::inputs(text),
            token,
            "translation_text",
        )
        .await
    }

    /// Translation only starts once captioning has succeeded. A failed
    /// translation keeps the caption in the returned error.
    pub async fn describe(
        &self,
        image: Vec<u8>,
        token: &str,
        translate: bool,
    ) -> Result<Description, DescribeError> {
        let caption = self.caption(image, token).await?;
        tracing::info!(%caption, "caption generated");

        let translation = if translate {
            match self.translate(&caption, token).await {
                Ok(text) => {
                    tracing::info!(translation = %text, "caption translated");
                    Some(text)
                }
                Err(error) => {
                    return Err(DescribeError {
                        caption: Some(caption),
                        error,
                    })
                }
            }
        } else {
            None
        };

        Ok(Description { caption, translation })
    }

    async fn call(
        &self,
        endpoint: Endpoint,
        url: &str,
        payload: Payload,
        token: &str,
        field: &str,
    ) -> Result<String, PipelineError> {
        let request = InferenceRequest {
            endpoint,
            url,
            payload,
            token,
        };

        match self.client.send(request).await {
            InferenceResult::Success { body } => {
                project_text(&body, field).ok_or_else(|| PipelineError::UnexpectedResponse {
                    endpoint: endpoint.as_str(),
                    body: body.to_string(),
                })
            }
            InferenceResult::Loading { retry_after_seconds } => Err(PipelineError::Loading {
                endpoint: endpoint.as_str(),
                retry_after_seconds,
            }),
            InferenceResult::Failure {
                message,
                status_code,
                kind,
            } => Err(PipelineError::Failed {
                endpoint: endpoint.as_str(),
                message,
                status_code,
                kind,
            }),
        }
    }
}
