//! Runtime configuration, read from the environment (and `.env`).

use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_CAPTION_URL: &str =
    "https://api-inference.huggingface.co/models/Salesforce/blip-image-captioning-large";
pub const DEFAULT_TRANSLATION_URL: &str =
    "https://api-inference.huggingface.co/models/Helsinki-NLP/opus-mt-en-te";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Generation limits the captioning and translation models run with.
/// Fixed, not user-tunable.
pub const CAPTION_MAX_LENGTH: usize = 50;
pub const CAPTION_NUM_BEAMS: usize = 4;
pub const TRANSLATION_MAX_LENGTH: usize = 60;

/// Token variables, checked in order.
const TOKEN_VARS: [&str; 2] = ["HF_API_TOKEN", "HUGGINGFACEHUB_API_TOKEN"];

#[derive(Clone)]
pub struct Config {
    pub caption_url: String,
    pub translation_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("caption_url", &self.caption_url)
            .field("translation_url", &self.translation_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            caption_url: DEFAULT_CAPTION_URL.to_string(),
            translation_url: DEFAULT_TRANSLATION_URL.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let api_token = TOKEN_VARS
            .iter()
            .filter_map(|key| lookup(*key))
            .find(|token| !token.trim().is_empty());

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: {:?}", raw))?;
                anyhow::ensure!(secs > 0, "REQUEST_TIMEOUT_SECS must be greater than zero");
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {:?}", raw))?,
            None => defaults.port,
        };

        Ok(Self {
            caption_url: lookup("CAPTION_API_URL").unwrap_or(defaults.caption_url),
            translation_url: lookup("TRANSLATION_API_URL").unwrap_or(defaults.translation_url),
            api_token,
            request_timeout,
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
