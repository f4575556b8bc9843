use ragchat_core::api::{HistoryEntry, QueryRequest, Transport};
use ragchat_core::{HttpTransport, Role, TransportError, UploadFile};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Raw request the stub server received
struct Captured {
    head: String,
    body: Vec<u8>,
}

/// Serves exactly one HTTP response on a local port
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\n\
             content-type: application/json\r\n\
             content-length: {}\r\n\
             connection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        captured
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return Captured {
                    head,
                    body: buf[end + 4..end + 4 + length].to_vec(),
                };
            }
        }
    }
    Captured {
        head: String::from_utf8_lossy(&buf).to_string(),
        body: Vec::new(),
    }
}

fn transport(base_url: &str) -> HttpTransport {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpTransport::with_client(base_url, client)
}

#[tokio::test]
async fn query_posts_question_and_history_as_json() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"answer": "Paris",
            "sources": [{"page_content": "...", "metadata": {"source": "geo.pdf"}}]}"#,
    )
    .await;

    let request = QueryRequest {
        query: "And its population?".to_string(),
        chat_history: vec![
            HistoryEntry {
                role: Role::User,
                content: "Capital of France?".to_string(),
            },
            HistoryEntry {
                role: Role::Assistant,
                content: "Paris".to_string(),
            },
        ],
    };
    let response = transport(&url).query(&request).await.unwrap();

    assert_eq!(response.answer, "Paris");
    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].name(), Some("geo.pdf"));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("POST /query HTTP/1.1"));
    let body: serde_json::Value = serde_json::from_slice(&captured.body).unwrap();
    assert_eq!(
        body,
        json!({
            "query": "And its population?",
            "chat_history": [
                {"role": "user", "content": "Capital of France?"},
                {"role": "assistant", "content": "Paris"}
            ]
        })
    );
}

#[tokio::test]
async fn answer_without_sources_defaults_to_empty() {
    let (url, _server) = serve_once("200 OK", r#"{"answer": "No documents yet."}"#).await;

    let request = QueryRequest {
        query: "Anything?".to_string(),
        chat_history: Vec::new(),
    };
    let response = transport(&url).query(&request).await.unwrap();

    assert_eq!(response.answer, "No documents yet.");
    assert!(response.sources.is_empty());
}

#[tokio::test]
async fn null_sources_and_metadata_read_as_empty() {
    let (url, _server) = serve_once("200 OK", r#"{"answer": "Paris", "sources": null}"#).await;

    let request = QueryRequest {
        query: "Capital of France?".to_string(),
        chat_history: Vec::new(),
    };
    let response = transport(&url).query(&request).await.unwrap();

    assert_eq!(response.answer, "Paris");
    assert!(response.sources.is_empty());

    let (url, _server) = serve_once(
        "200 OK",
        r#"{"answer": "Paris", "sources": [{"page_content": "...", "metadata": null}]}"#,
    )
    .await;
    let response = transport(&url).query(&request).await.unwrap();

    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].label(), "Unknown source");
}

#[tokio::test]
async fn error_status_maps_to_api_error_with_detail() {
    let (url, _server) = serve_once(
        "503 Service Unavailable",
        r#"{"detail": "Khoj service is not available"}"#,
    )
    .await;

    let request = QueryRequest {
        query: "Hello?".to_string(),
        chat_history: Vec::new(),
    };
    let err = transport(&url).query(&request).await.unwrap_err();

    match err {
        TransportError::Api { status, detail } => {
            assert_eq!(status, 503);
            assert_eq!(detail, "Khoj service is not available");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_answer_is_a_json_error() {
    let (url, _server) = serve_once("200 OK", r#"{"unexpected": true}"#).await;

    let request = QueryRequest {
        query: "Hello?".to_string(),
        chat_history: Vec::new(),
    };
    let err = transport(&url).query(&request).await.unwrap_err();

    assert!(matches!(err, TransportError::Json(_)));
}

#[tokio::test]
async fn unreachable_backend_is_an_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let request = QueryRequest {
        query: "Hello?".to_string(),
        chat_history: Vec::new(),
    };
    let err = transport(&format!("http://{addr}"))
        .query(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Http(_)));
}

#[tokio::test]
async fn upload_sends_single_multipart_file_field() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"message": "Document processed successfully", "document_id": "abc123"}"#,
    )
    .await;

    let file = UploadFile::new("report.pdf", b"%PDF-1.4 fake".to_vec());
    let receipt = transport(&url).upload(&file).await.unwrap();

    assert_eq!(receipt.document_id.as_deref(), Some("abc123"));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("POST /upload HTTP/1.1"));
    assert!(captured
        .head
        .to_lowercase()
        .contains("content-type: multipart/form-data; boundary="));
    let body = String::from_utf8_lossy(&captured.body);
    assert_eq!(body.matches("form-data;").count(), 1);
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="report.pdf""#));
    assert!(body.to_lowercase().contains("content-type: application/pdf"));
    assert!(body.contains("%PDF-1.4 fake"));
}

#[tokio::test]
async fn upload_success_needs_no_body() {
    let (url, _server) = serve_once("200 OK", "").await;

    let file = UploadFile::new("notes.txt", b"hello".to_vec());
    let receipt = transport(&url).upload(&file).await.unwrap();

    assert_eq!(receipt.document_id, None);
}

#[tokio::test]
async fn upload_failure_maps_to_api_error() {
    let (url, _server) = serve_once(
        "500 Internal Server Error",
        r#"{"detail": "Error processing document: unsupported format"}"#,
    )
    .await;

    let file = UploadFile::new("notes.txt", b"hello".to_vec());
    let err = transport(&url).upload(&file).await.unwrap_err();

    assert!(matches!(err, TransportError::Api { status: 500, .. }));
}

#[tokio::test]
async fn health_reports_service_states() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"status": "healthy",
            "services": {"backend": "healthy", "chroma": "healthy", "khoj": "unknown"}}"#,
    )
    .await;

    let report = transport(&url).health().await.unwrap();

    assert_eq!(report.status, "healthy");
    assert_eq!(report.services.get("khoj").map(String::as_str), Some("unknown"));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("GET /health HTTP/1.1"));
}
