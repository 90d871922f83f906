//! Image captioning with optional Telugu translation, backed by hosted
//! inference endpoints.

pub mod cli;
pub mod client;
pub mod config;
pub mod pipeline;
pub mod server;
pub mod upload;

pub use client::{
    Endpoint, FailureKind, InferenceClient, InferenceRequest, InferenceResult, Payload,
};
pub use config::Config;
pub use pipeline::{DescribeError, Description, Pipeline, PipelineError};
