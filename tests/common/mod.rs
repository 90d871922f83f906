//! Stub inference upstream for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use image_caption_translator::{Config, InferenceClient, Pipeline};

/// What the hosted API answers while the captioning model is paged in.
pub const CAPTION_LOADING_BODY: &str = concat!(
    r#"{"error":"Model blip-image-captioning-large is currently loading","#,
    r#""estimated_time":15.7}"#
);

#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Canned {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct StubState {
    routes: HashMap<String, Canned>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct StubServer {
    pub addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubServer {
    pub async fn start(routes: &[(&str, Canned)]) -> Self {
        let state = Arc::new(StubState {
            routes: routes
                .iter()
                .map(|(path, canned)| (path.to_string(), canned.clone()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(respond).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    /// Pipeline pointed at `/caption` and `/translate` on this stub.
    pub fn pipeline(&self) -> Pipeline {
        let config = Config {
            caption_url: self.url("/caption"),
            translation_url: self.url("/translate"),
            request_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        let client = InferenceClient::new(config.request_timeout).unwrap();
        Pipeline::new(client, &config)
    }
}

async fn respond(
    State(state): State<Arc<StubState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    let Some(canned) = state.routes.get(uri.path()).cloned() else {
        return (StatusCode::NOT_FOUND, "no such route").into_response();
    };

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(canned.status).unwrap();
    (status, canned.body).into_response()
}

/// A small PNG, suitable as an upload.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 120, 40]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .unwrap();
    png
}
