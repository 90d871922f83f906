//! Command line interface.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::client::InferenceClient;
use crate::config::Config;
use crate::pipeline::{resolve_token, Pipeline};
use crate::server::{self, AppState};
use crate::upload;

/// Describe images in English and Telugu using hosted models
#[derive(Parser)]
#[command(name = "image-caption-translator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web app (default)
    Serve {
        /// Host to bind to (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Describe a single image and print the result
    Describe {
        /// Path to a jpg or png image
        image: PathBuf,

        /// Also translate the caption to Telugu
        #[arg(long)]
        translate: bool,

        /// API token (overrides HF_API_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
}

fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let client =
        InferenceClient::new(config.request_timeout).context("failed to build HTTP client")?;
    Ok(Pipeline::new(client, config))
}

pub async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let pipeline = build_pipeline(&config)?;
    let state = Arc::new(AppState::new(pipeline, config.api_token.clone()));

    server::serve(state, &config.addr()).await
}

pub async fn describe(
    config: Config,
    image: PathBuf,
    translate: bool,
    token: Option<String>,
) -> Result<()> {
    let token = resolve_token(token.as_deref(), config.api_token.as_deref())?.to_string();
    let jpeg = load_image(&image)?;

    let pipeline = build_pipeline(&config)?;
    let description = match pipeline.describe(jpeg, &token, translate).await {
        Ok(description) => description,
        Err(e) => {
            if let Some(caption) = &e.caption {
                println!("Description: {}", caption);
            }
            return Err(e.into());
        }
    };

    println!("Description: {}", description.caption);
    if let Some(translation) = description.translation {
        println!("Telugu: {}", translation);
    }
    Ok(())
}

/// Reads an image file and normalizes it for upload.
pub fn load_image(path: &Path) -> Result<Vec<u8>> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    anyhow::ensure!(
        data.len() <= upload::MAX_UPLOAD_BYTES,
        "{} is larger than {} bytes",
        path.display(),
        upload::MAX_UPLOAD_BYTES
    );
    upload::to_rgb_jpeg(&data)
        .with_context(|| format!("{} is not a supported image", path.display()))
}
