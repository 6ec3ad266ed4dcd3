/*!
 * Tests for provider implementations and the translation service
 */

use std::time::Duration;

use docx_translate::errors::{ProviderError, TranslationError};
use docx_translate::providers::Provider;
use docx_translate::providers::mock::MockProvider;
use docx_translate::providers::openai::{OpenAIMessage, OpenAIRequest};
use docx_translate::translation::protocol::{self, Delimiter};
use docx_translate::translation::{TranslationOptions, TranslationService};

use crate::common::SAMPLE_TEXTS;

fn fast_options(retry_count: u32) -> TranslationOptions {
    TranslationOptions {
        timeout: Duration::from_millis(500),
        retry_count,
        retry_backoff: Duration::from_millis(1),
        temperature: None,
    }
}

#[test]
fn test_openAIRequest_builder_shouldCollectMessagesAndOptions() {
    let request = OpenAIRequest::new("gpt-4o")
        .messages(vec![OpenAIMessage::new("system", "translate")])
        .add_message("user", "Hello")
        .temperature(0.2)
        .max_tokens(64);

    assert_eq!(request.model, "gpt-4o");
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.user_content(), "Hello");
    assert_eq!(request.temperature, Some(0.2));
    assert_eq!(request.max_tokens, Some(64));
}

#[test]
fn test_mockProvider_withBlockingRuntime_shouldEchoUserContent() {
    let provider = MockProvider::echo();
    let request = OpenAIRequest::new("gpt-4o-mini").add_message("user", "Labas");

    let response = tokio_test::block_on(provider.complete(request)).expect("echo never fails");

    assert_eq!(MockProvider::extract_text(&response), "Labas");
    assert!(response.usage.is_some());
}

#[tokio::test]
async fn test_translate_withEchoProvider_shouldReturnPackedText() {
    let delimiter = Delimiter::default();
    let packed = protocol::pack(&SAMPLE_TEXTS, &delimiter);
    let service = TranslationService::new(MockProvider::echo(), fast_options(0));

    let output = service
        .translate(&packed, "Lithuanian", "gpt-4o-mini", &delimiter)
        .await
        .expect("translation succeeds");

    assert_eq!(output.text, packed);
    assert_eq!(output.attempts, 1);
    let request = service.provider().last_request().expect("request recorded");
    assert_eq!(request.messages[0].role, "system");
    assert!(request.messages[0].content.contains("Lithuanian"));
    assert_eq!(request.user_content(), packed);
}

#[tokio::test]
async fn test_completeMessages_withTemperature_shouldSendIt() {
    let mut options = fast_options(0);
    options.temperature = Some(0.3);
    let service = TranslationService::new(MockProvider::echo(), options);

    service
        .complete_messages("gpt-4o-mini", vec![OpenAIMessage::new("user", "x")])
        .await
        .expect("translation succeeds");

    assert_eq!(service.provider().last_request().and_then(|r| r.temperature), Some(0.3));
}

#[tokio::test]
async fn test_completeMessages_withIntermittentFailure_shouldRetry() {
    // Every second request fails
    let service = TranslationService::new(MockProvider::intermittent(2), fast_options(2));
    service
        .complete_messages("gpt-4o-mini", vec![OpenAIMessage::new("user", "first")])
        .await
        .expect("first request succeeds");

    let output = service
        .complete_messages("gpt-4o-mini", vec![OpenAIMessage::new("user", "second")])
        .await
        .expect("retried request succeeds");

    assert_eq!(output.text, "second");
    assert_eq!(output.attempts, 2);
    assert_eq!(service.provider().request_count(), 3);
}

#[tokio::test]
async fn test_completeMessages_withUnauthorizedProvider_shouldNotRetry() {
    let service = TranslationService::new(MockProvider::unauthorized(), fast_options(3));

    let result = service
        .complete_messages("gpt-4o-mini", vec![OpenAIMessage::new("user", "x")])
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::AuthenticationError(_)))
    ));
    assert_eq!(service.provider().request_count(), 1);
}

#[tokio::test]
async fn test_completeMessages_withSlowProvider_shouldTimeOutEachAttempt() {
    let options = TranslationOptions {
        timeout: Duration::from_millis(20),
        retry_count: 1,
        retry_backoff: Duration::from_millis(1),
        temperature: None,
    };
    let service = TranslationService::new(MockProvider::slow(500), options);

    let result = service
        .complete_messages("gpt-4o-mini", vec![OpenAIMessage::new("user", "x")])
        .await;

    match result {
        Err(TranslationError::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, TranslationError::Timeout { .. }));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_completeMessages_withEmptyResponse_shouldFail() {
    let service = TranslationService::new(MockProvider::empty(), fast_options(2));

    let result = service
        .complete_messages("gpt-4o-mini", vec![OpenAIMessage::new("user", "x")])
        .await;

    assert_eq!(result.err(), Some(TranslationError::EmptyResponse));
    assert_eq!(service.provider().request_count(), 1);
}
