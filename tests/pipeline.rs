mod common;

use common::{Canned, StubServer};
use image_caption_translator::{DescribeError, Description, PipelineError};

const TELUGU: &str = "కిటికీ మీద కూర్చున్న పిల్లి";

#[tokio::test]
async fn caption_then_translation() {
    let stub = StubServer::start(&[
        (
            "/caption",
            Canned::new(200, r#"{"generated_text":"a cat sitting on a windowsill"}"#),
        ),
        (
            "/translate",
            Canned::new(200, format!(r#"{{"translation_text":"{}"}}"#, TELUGU)),
        ),
    ])
    .await;

    let description = stub.pipeline().describe(vec![1, 2, 3], "hf_test", true).await.unwrap();

    assert_eq!(
        description,
        Description {
            caption: "a cat sitting on a windowsill".to_string(),
            translation: Some(TELUGU.to_string()),
        }
    );

    let sent: serde_json::Value =
        serde_json::from_slice(&stub.requests_to("/translate")[0].body).unwrap();
    assert_eq!(sent["inputs"], "a cat sitting on a windowsill");
}

#[tokio::test]
async fn translation_is_skipped_when_not_requested() {
    let stub = StubServer::start(&[(
        "/caption",
        Canned::new(200, r#"[{"generated_text":"a dog on a beach"}]"#),
    )])
    .await;

    let description = stub
        .pipeline()
        .describe(vec![1], "hf_test", false)
        .await
        .unwrap();

    assert_eq!(description.caption, "a dog on a beach");
    assert_eq!(description.translation, None);
    assert!(stub.requests_to("/translate").is_empty());
}

#[tokio::test]
async fn loading_caption_stops_before_translation() {
    let stub = StubServer::start(&[
        (
            "/caption",
            Canned::new(
                503,
                r#"{"error":"Model x is currently loading","estimated_time":42.9}"#,
            ),
        ),
        ("/translate", Canned::new(200, r#"[{"translation_text":"unused"}]"#)),
    ])
    .await;

    let err = stub
        .pipeline()
        .describe(vec![1], "hf_test", true)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DescribeError {
            caption: None,
            error: PipelineError::Loading {
                endpoint: "captioning",
                retry_after_seconds: 42
            },
        }
    );
    assert!(stub.requests_to("/translate").is_empty());
}

#[tokio::test]
async fn translation_failure_names_its_stage() {
    let stub = StubServer::start(&[
        ("/caption", Canned::new(200, r#"[{"generated_text":"a bird"}]"#)),
        ("/translate", Canned::new(400, r#"{"error":"Input is too long"}"#)),
    ])
    .await;

    let err = stub
        .pipeline()
        .describe(vec![1], "hf_test", true)
        .await
        .unwrap_err();

    assert_eq!(err.error.stage(), Some("translation"));
    assert_eq!(err.caption.as_deref(), Some("a bird"));
    let message = err.to_string();
    assert!(message.contains("Input is too long"));
    assert!(message.contains("400"));
}

#[tokio::test]
async fn loading_translation_keeps_caption() {
    let stub = StubServer::start(&[
        ("/caption", Canned::new(200, r#"[{"generated_text":"an orange square"}]"#)),
        (
            "/translate",
            Canned::new(
                503,
                r#"{"error":"Model opus is currently loading","estimated_time":9.0}"#,
            ),
        ),
    ])
    .await;

    let err = stub
        .pipeline()
        .describe(vec![1], "hf_test", true)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DescribeError {
            caption: Some("an orange square".to_string()),
            error: PipelineError::Loading {
                endpoint: "translation",
                retry_after_seconds: 9
            },
        }
    );
}

#[tokio::test]
async fn success_without_expected_field_is_unexpected() {
    let stub = StubServer::start(&[(
        "/caption",
        Canned::new(200, r#"[{"label":"cat","score":0.9}]"#),
    )])
    .await;

    let err = stub.pipeline().caption(vec![1], "hf_test").await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::UnexpectedResponse {
            endpoint: "captioning",
            ..
        }
    ));
}
