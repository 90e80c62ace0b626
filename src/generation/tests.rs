use super::*;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves one canned HTTP response and hands back the raw request.
async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{addr}/v1/chat/completions"), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.expect("read");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
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
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn client(endpoint: &str) -> ChatCompletionClient {
    ChatCompletionClient::new(
        GeneratorConfig::new("secret-key")
            .with_endpoint(endpoint)
            .with_model("judge-model")
            .with_timeout(Duration::from_secs(5)),
    )
    .expect("client builds")
}

mod config_tests {
    use super::*;
    use crate::constants::{DEFAULT_CHAT_COMPLETIONS_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.endpoint, DEFAULT_CHAT_COMPLETIONS_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug = format!("{:?}", GeneratorConfig::new("sk-very-secret"));
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let err = GeneratorConfig::default()
            .with_endpoint("ftp://example.com")
            .validate()
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let err = GeneratorConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        assert!(GeneratorConfig::default().with_model(" ").validate().is_err());
    }
}

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_sends_chat_request_and_trims_reply() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  hello there \n"}}]}"#;
        let (endpoint, server) = serve_once("200 OK", body.to_string()).await;

        let reply = client(&endpoint)
            .generate("Which step?", 0.3)
            .await
            .expect("generates");
        assert_eq!(reply, "hello there");

        let request = server.await.expect("server");
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer secret-key"));

        let json_start = request.find('{').expect("json body");
        let sent: serde_json::Value = serde_json::from_str(&request[json_start..]).expect("json");
        assert_eq!(sent["model"], "judge-model");
        assert_eq!(sent["messages"][0]["role"], "user");
        assert_eq!(sent["messages"][0]["content"], "Which step?");
        assert!((sent["temperature"].as_f64().expect("number") - 0.3).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let (endpoint, server) =
            serve_once("429 Too Many Requests", r#"{"error":"rate limited"}"#.to_string()).await;

        let err = client(&endpoint).generate("q", 0.3).await.unwrap_err();
        match err {
            GenerationError::Http { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.await.expect("server");
    }

    #[tokio::test]
    async fn test_missing_choices_is_malformed() {
        let (endpoint, server) = serve_once("200 OK", r#"{"choices":[]}"#.to_string()).await;
        let err = client(&endpoint).generate("q", 0.3).await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse { .. }));
        server.await.expect("server");
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let (endpoint, server) = serve_once("200 OK", "<html>oops</html>".to_string()).await;
        let err = client(&endpoint).generate("q", 0.3).await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse { .. }));
        server.await.expect("server");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let err = client(&format!("http://{addr}/v1/chat/completions"))
            .generate("q", 0.3)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(socket);
        });

        let client = ChatCompletionClient::new(
            GeneratorConfig::new("k")
                .with_endpoint(format!("http://{addr}/"))
                .with_timeout(Duration::from_millis(200)),
        )
        .expect("client builds");

        let err = client.generate("q", 0.3).await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { .. }));
        server.abort();
    }
}

mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_prompts() {
        let mock = MockTextGenerator::replying("ok");
        assert_eq!(mock.generate("first", 0.3).await.expect("ok"), "ok");
        assert_eq!(mock.generate("second", 0.7).await.expect("ok"), "ok");
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.prompts(), vec!["first", "second"]);
        assert_eq!(mock.temperatures(), vec![0.3, 0.7]);
    }

    #[tokio::test]
    async fn test_unavailable_mock_fails() {
        let mock = MockTextGenerator::unavailable();
        assert!(matches!(
            mock.generate("q", 0.3).await.unwrap_err(),
            GenerationError::Transport { .. }
        ));
    }
}
