// Integration tests for the streaming client against a local HTTP server
// that replays canned responses.

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use riftcall_core::champions::ChampionDirectory;
use riftcall_core::normalize::normalize;
use riftcall_core::ports::{RecommendError, Recommender};
use riftcall_core::snapshot::RawSession;
use riftcall_llm::OpenAiClient;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Serve exactly one HTTP response on an ephemeral port. The handle resolves
/// to the raw request text the client sent.
async fn serve_once(status: &'static str, content_type: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (url, handle)
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
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let lower = line.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return text;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn sse(events: &[&str]) -> String {
    events.iter().map(|data| format!("data: {data}\n\n")).collect()
}

fn delta(content: &str) -> String {
    json!({ "choices": [{ "index": 0, "delta": { "content": content } }] }).to_string()
}

fn client(url: String) -> OpenAiClient {
    OpenAiClient::new(
        url,
        "sk-test".to_string(),
        "gpt-4o-mini".to_string(),
        300,
        Arc::new(ChampionDirectory::builtin()),
    )
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn streams_recommendation_for_view() {
    let first = delta("Pick Ahri. ");
    let second = delta("Recommended Picks: Ahri, Syndra, Orianna");
    let body = sse(&[&first, &second, "[DONE]"]);
    let (url, server) = serve_once("200 OK", "text/event-stream", body).await;

    let raw = RawSession::from_value(json!({
        "myTeam": [ { "cellId": 2, "summonerId": 5, "assignedPosition": "MIDDLE" } ],
        "theirTeam": [ { "cellId": 7, "championId": 238 } ],
        "timer": { "phase": "BAN_PICK" }
    }));
    let view = normalize(Some(&raw), 5, &ChampionDirectory::builtin()).unwrap();

    let text = client(url).recommend(&view).await.unwrap();
    assert_eq!(text, "Pick Ahri. Recommended Picks: Ahri, Syndra, Orianna");

    let request = server.await.unwrap();
    let lower = request.to_ascii_lowercase();
    assert!(lower.starts_with("post /v1/chat/completions"));
    assert!(lower.contains("authorization: bearer sk-test"));
    assert!(request.contains("\"stream\":true"));
    assert!(request.contains("My role: MIDDLE"));
    assert!(request.contains("Zed"));
}

#[tokio::test]
async fn stream_without_done_marker_still_completes() {
    let body = sse(&[&delta("partial but usable")]);
    let (url, _server) = serve_once("200 OK", "text/event-stream", body).await;

    let text = client(url).complete("system", "user").await.unwrap();
    assert_eq!(text, "partial but usable");
}

#[tokio::test]
async fn empty_stream_is_empty_response() {
    let finish = json!({ "choices": [{ "index": 0, "delta": {}, "finish_reason": "content_filter" }] })
        .to_string();
    let body = sse(&[&finish, "[DONE]"]);
    let (url, _server) = serve_once("200 OK", "text/event-stream", body).await;

    assert_eq!(
        client(url).complete("system", "user").await,
        Err(RecommendError::EmptyResponse {
            finish_reason: "content_filter".to_string()
        })
    );
}

#[tokio::test]
async fn http_error_carries_status_and_message() {
    let body = json!({ "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" } })
        .to_string();
    let (url, _server) = serve_once("401 Unauthorized", "application/json", body).await;

    assert_eq!(
        client(url).complete("system", "user").await,
        Err(RecommendError::Status {
            status: 401,
            message: "Incorrect API key provided".to_string()
        })
    );
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
    drop(listener);

    assert!(matches!(
        client(url).complete("system", "user").await,
        Err(RecommendError::Network(_))
    ));
}
