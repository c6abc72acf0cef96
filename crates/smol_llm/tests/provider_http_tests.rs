//! HTTP-level tests for the provider backends against a local stub server.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use smol_llm::{
    CodeGenerator, CodeProvider, CompletionRequest, GeminiProvider, LlmError, OpenAiProvider,
    PromptTemplates, ProviderConfig, ProviderKind, ProviderRouter, StaticCredentials,
};

/// Serve a single canned response and hand back the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn timeout() -> Option<Duration> {
    Some(Duration::from_secs(5))
}

#[tokio::test]
async fn test_openai_round_trip() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"import gradio as gr"}}]}"#,
    )
    .await;

    let config = ProviderConfig::new(ProviderKind::OpenAi).base_url(base);
    let provider = OpenAiProvider::new(&config, timeout()).unwrap();
    let request = CompletionRequest::new("counter", 0.2).system("code only");

    let text = provider.complete(&request, "sk-test").await.unwrap();
    assert_eq!(text, "import gradio as gr");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1/chat/completions"));
    assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
    assert!(raw.contains("\"model\":\"gpt-4o\""));
    assert!(raw.contains("\"temperature\":0.2"));
}

#[tokio::test]
async fn test_gemini_round_trip() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"app.launch()"}]}}]}"#,
    )
    .await;

    let config = ProviderConfig::new(ProviderKind::Gemini).base_url(base);
    let provider = GeminiProvider::new(&config, timeout()).unwrap();

    let text = provider
        .complete(&CompletionRequest::new("counter", 0.2), "g-key")
        .await
        .unwrap();
    assert_eq!(text, "app.launch()");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1beta/models/gemini-1.5-pro:generateContent"));
    assert!(raw.to_lowercase().contains("x-goog-api-key: g-key"));
}

#[tokio::test]
async fn test_http_error_status_is_provider_error() {
    let (base, _server) = serve_once("500 Internal Server Error", r#"{"error":"overloaded"}"#).await;

    let config = ProviderConfig::new(ProviderKind::OpenAi).base_url(base);
    let provider = OpenAiProvider::new(&config, timeout()).unwrap();

    let err = provider
        .complete(&CompletionRequest::new("x", 0.2), "k")
        .await
        .unwrap_err();
    match err {
        LlmError::ProviderError { provider, message } => {
            assert_eq!(provider, ProviderKind::OpenAi);
            assert!(message.contains("500"));
            assert!(message.contains("overloaded"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_generator_over_http() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"content":"print('counter')"}}]}"#,
    )
    .await;

    let configs = [ProviderConfig::new(ProviderKind::OpenAi).base_url(base)];
    let credentials = StaticCredentials::new().with("OPENAI_API_KEY", "sk-live");
    let router = ProviderRouter::from_configs(&configs, timeout(), Arc::new(credentials)).unwrap();
    let generator = CodeGenerator::new(Arc::new(router), PromptTemplates::new(7861));

    let text = generator
        .generate("a counter app with increment button", ProviderKind::OpenAi)
        .await
        .unwrap();
    assert_eq!(text, "print('counter')");

    let raw = server.await.unwrap();
    assert!(raw.contains("a counter app with increment button"));
    assert!(raw.contains("7861"));
}
