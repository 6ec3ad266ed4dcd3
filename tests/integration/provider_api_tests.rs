/*!
 * Integration tests for the OpenAI client against local and live endpoints
 */

use std::env;
use std::time::Duration;

use anyhow::Result;
use docx_translate::errors::ProviderError;
use docx_translate::providers::Provider;
use docx_translate::providers::openai::{OpenAI, OpenAIRequest};
use docx_translate::translation::protocol::{self, Delimiter};
use docx_translate::translation::{TranslationOptions, TranslationService};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::common::SAMPLE_TEXTS;

/// Serve one canned HTTP response on a local port, returning the endpoint
/// and a handle yielding the raw request
async fn serve_once(status: &'static str, body: String) -> Result<(String, tokio::task::JoinHandle<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let endpoint = format!("http://{}/v1", listener.local_addr()?);

    let handle = tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return String::new();
        };
        let mut received = Vec::new();
        let mut buffer = [0u8; 4096];
        // Read headers, then as much body as Content-Length announces
        loop {
            let Ok(n) = socket.read(&mut buffer).await else { break };
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buffer[..n]);
            let text = String::from_utf8_lossy(&received).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if received.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&received).to_string()
    });

    Ok((endpoint, handle))
}

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-local",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160 }
    })
    .to_string()
}

#[tokio::test]
async fn test_openai_complete_withLocalServer_shouldSendBearerAndParseResponse() -> Result<()> {
    let (endpoint, handle) = serve_once("200 OK", completion_body("Labas")).await?;
    let client = OpenAI::new_with_config("sk-local", endpoint, Duration::from_secs(5));
    let request = OpenAIRequest::new("gpt-4o-mini")
        .add_message("system", "translate")
        .add_message("user", "Hello");

    let response = client.complete(request).await?;
    let raw_request = handle.await?;

    assert_eq!(OpenAI::extract_text(&response), "Labas");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(160));
    assert!(raw_request.starts_with("POST /v1/chat/completions"));
    assert!(raw_request.to_lowercase().contains("authorization: bearer sk-local"));
    assert!(raw_request.contains(r#""model":"gpt-4o-mini""#));
    Ok(())
}

#[tokio::test]
async fn test_openai_complete_withUnauthorizedStatus_shouldMapToAuthenticationError() -> Result<()> {
    let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
    let (endpoint, _handle) = serve_once("401 Unauthorized", body.to_string()).await?;
    let client = OpenAI::new_with_config("sk-wrong", endpoint, Duration::from_secs(5));

    let result = client
        .complete(OpenAIRequest::new("gpt-4o-mini").add_message("user", "Hello"))
        .await;

    assert_eq!(
        result.err(),
        Some(ProviderError::AuthenticationError("Incorrect API key provided".to_string()))
    );
    Ok(())
}

#[tokio::test]
async fn test_openai_complete_withServerError_shouldBeRetryable() -> Result<()> {
    let (endpoint, _handle) = serve_once("503 Service Unavailable", "overloaded".to_string()).await?;
    let client = OpenAI::new_with_config("sk-local", endpoint, Duration::from_secs(5));

    let error = client
        .complete(OpenAIRequest::new("gpt-4o-mini").add_message("user", "Hello"))
        .await
        .expect_err("503 must fail");

    assert_eq!(
        error,
        ProviderError::ApiError {
            status_code: 503,
            message: "overloaded".to_string()
        }
    );
    assert!(error.is_retryable());
    Ok(())
}

#[tokio::test]
async fn test_openai_complete_withRefusedConnection_shouldFail() -> Result<()> {
    // Bind then drop to get a port nothing listens on
    let port = TcpListener::bind("127.0.0.1:0").await?.local_addr()?.port();
    let client = OpenAI::new_with_config("sk-local", format!("http://127.0.0.1:{}/v1", port), Duration::from_secs(5));

    let result = client
        .complete(OpenAIRequest::new("gpt-4o-mini").add_message("user", "Hello"))
        .await;

    assert!(result.is_err());
    Ok(())
}

/// Live round trip; needs OPENAI_API_KEY and network access
#[tokio::test]
#[ignore]
async fn test_openai_translate_withLiveApi_shouldKeepBlockCount() -> Result<()> {
    let Ok(api_key) = env::var("OPENAI_API_KEY") else {
        println!("OPENAI_API_KEY not set, skipping");
        return Ok(());
    };

    let delimiter = Delimiter::default();
    let packed = protocol::pack(&SAMPLE_TEXTS, &delimiter);
    let client = OpenAI::new(api_key, "");
    let service = TranslationService::new(client, TranslationOptions::default());

    let output = service
        .translate(&packed, "Lithuanian", "gpt-4o-mini", &delimiter)
        .await?;

    let reconciliation = protocol::reconcile(&output.text, SAMPLE_TEXTS.len(), &delimiter);
    println!("{:?}", reconciliation);
    assert!(!output.text.is_empty());
    assert!(output.usage.is_some());
    Ok(())
}
