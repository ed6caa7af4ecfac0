//! Mock HTTP tests for the remote translation service client and the
//! embedded-translator fallback policy.

use braille_emboss::{
    convert, BrailleError, BrailleTranslator, ConversionConfig, Grade, RemoteTranslator, Stage, TranslatorKind,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_config(url: String, fallback: bool) -> ConversionConfig {
    ConversionConfig::builder()
        .translator(TranslatorKind::Remote { url })
        .translator_timeout_secs(5)
        .fallback_to_embedded(fallback)
        .build()
        .unwrap()
}

// === Client ===

#[tokio::test]
async fn test_convert_sends_grade_and_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .and(body_partial_json(serde_json::json!({
            "text": "hi",
            "grade": 1,
            "table": "en-us-g1.ctb"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "braille_text": "⠓⠊",
            "pagination": {"total_pages": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let translator = RemoteTranslator::new(format!("{}/", mock_server.uri()), 5).unwrap();
    assert_eq!(translator.base_url(), mock_server.uri());
    let cells = translator.translate("hi", Grade::One).await.unwrap();
    assert_eq!(cells, "⠓⠊");
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let translator = RemoteTranslator::new(mock_server.uri(), 5).unwrap();
    let err = translator.translate("hi", Grade::Two).await.unwrap_err();
    assert!(err.is_unavailable(), "got: {err:?}");
    assert_eq!(err.stage(), Stage::Translation);
}

#[tokio::test]
async fn test_engine_error_status_is_content_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "error": "table not found"
        })))
        .mount(&mock_server)
        .await;

    let translator = RemoteTranslator::new(mock_server.uri(), 5).unwrap();
    let err = translator.translate("hi", Grade::Two).await.unwrap_err();
    match err {
        BrailleError::TranslationContent { reason, .. } => assert!(reason.contains("table not found")),
        other => panic!("expected content error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_output_is_content_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "braille_text": ""
        })))
        .mount(&mock_server)
        .await;

    let translator = RemoteTranslator::new(mock_server.uri(), 5).unwrap();
    let err = translator.translate("hi", Grade::Two).await.unwrap_err();
    assert!(matches!(err, BrailleError::TranslationContent { .. }));
}

#[tokio::test]
async fn test_health_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let translator = RemoteTranslator::new(mock_server.uri(), 5).unwrap();
    assert!(translator.health().await.is_ok());
}

// === Fallback policy ===

#[tokio::test]
async fn test_unavailable_without_fallback_fails_conversion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = convert("Hello world.", &remote_config(mock_server.uri(), false))
        .await
        .unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_unavailable_with_fallback_uses_embedded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = convert("Hello world.", &remote_config(mock_server.uri(), true))
        .await
        .unwrap();
    assert!(output.stats.fell_back);
    assert_eq!(output.stats.translator_used, "embedded");
    assert_eq!(output.pagination.total_pages, 1);
}

#[tokio::test]
async fn test_content_error_does_not_fall_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "error": "unsupported characters"
        })))
        .mount(&mock_server)
        .await;

    let err = convert("Hello world.", &remote_config(mock_server.uri(), true))
        .await
        .unwrap_err();
    assert!(matches!(err, BrailleError::TranslationContent { .. }));
}

#[tokio::test]
async fn test_remote_output_is_paginated_locally() {
    let mock_server = MockServer::start().await;
    let braille = vec!["⠁⠃⠉"; 30].join("\n");

    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "braille_text": braille,
            "pagination": {"total_pages": 99}
        })))
        .mount(&mock_server)
        .await;

    let output = convert("Hello world.", &remote_config(mock_server.uri(), false))
        .await
        .unwrap();
    assert_eq!(output.stats.translator_used, "remote");
    assert_eq!(output.pagination.total_pages, 2);
}
