mod common;

use serial_test::serial;
use std::time::Duration;

use common::{model_output, ollama_client, unreachable_base_url, MockBackend, MockReply};
use itinerary_api::services::generation_client::{GenerationBackend, GenerationError};
use itinerary_api::services::prompt_builder::PromptText;

fn prompt() -> PromptText {
    PromptText {
        instruction: "Plan a day".to_string(),
        schema: "{}".to_string(),
    }
}

#[actix_rt::test]
#[serial]
async fn test_returns_raw_model_text() {
    let text = model_output(1, 3);
    let backend = MockBackend::start(MockReply::Generate(text.clone())).await;
    let client = ollama_client(&backend.base_url, Duration::from_secs(5));

    let raw = client.generate(&prompt()).await.unwrap();
    assert_eq!(raw, text);

    backend.stop().await;
}

#[actix_rt::test]
#[serial]
async fn test_non_success_status_is_http_error() {
    let backend = MockBackend::start(MockReply::Status(500)).await;
    let client = ollama_client(&backend.base_url, Duration::from_secs(5));

    let err = client.generate(&prompt()).await.unwrap_err();
    assert_eq!(err, GenerationError::BackendHttpError(500));

    backend.stop().await;
}

#[actix_rt::test]
#[serial]
async fn test_blank_response_is_empty() {
    let backend = MockBackend::start(MockReply::Generate("   \n".to_string())).await;
    let client = ollama_client(&backend.base_url, Duration::from_secs(5));

    let err = client.generate(&prompt()).await.unwrap_err();
    assert_eq!(err, GenerationError::EmptyResponse);

    backend.stop().await;
}

#[actix_rt::test]
#[serial]
async fn test_unexpected_body_is_invalid_envelope() {
    let backend = MockBackend::start(MockReply::RawBody("<html>proxy error</html>".to_string())).await;
    let client = ollama_client(&backend.base_url, Duration::from_secs(5));

    let err = client.generate(&prompt()).await.unwrap_err();
    assert!(matches!(err, GenerationError::InvalidEnvelope(_)), "got {:?}", err);

    backend.stop().await;
}

#[actix_rt::test]
#[serial]
async fn test_slow_backend_times_out() {
    let backend = MockBackend::start(MockReply::Delayed(
        Duration::from_secs(3),
        model_output(1, 1),
    ))
    .await;
    let client = ollama_client(&backend.base_url, Duration::from_millis(200));

    let err = client.generate(&prompt()).await.unwrap_err();
    assert_eq!(err, GenerationError::BackendTimeout(Duration::from_millis(200)));

    backend.stop().await;
}

#[actix_rt::test]
#[serial]
async fn test_connection_refused_is_unreachable() {
    let client = ollama_client(&unreachable_base_url(), Duration::from_secs(5));

    let err = client.generate(&prompt()).await.unwrap_err();
    assert!(matches!(err, GenerationError::BackendUnreachable(_)), "got {:?}", err);
    assert!(matches!(
        client.health_check().await,
        Err(GenerationError::BackendUnreachable(_))
    ));
}

#[actix_rt::test]
#[serial]
async fn test_health_check_against_running_backend() {
    let backend = MockBackend::start(MockReply::Status(503)).await;
    let client = ollama_client(&backend.base_url, Duration::from_secs(5));

    assert_eq!(client.health_check().await, Ok(()));

    backend.stop().await;
}
