use async_trait::async_trait;
use thiserror::Error;

/// HTTP headers represented as key/value pairs.
///
/// Header names are treated case-insensitively by helper functions.
pub type HttpHeaders = Vec<(String, String)>;

/// A minimal GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HttpHeaders,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("http transport error: {0}")]
    Transport(String),

    #[error("no mock response registered for GET {url}")]
    NoMockResponse { url: String },
}

impl HttpError {
    /// Connection failures and timeouts may succeed on a later attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout(_))
    }
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Get the first header value matching `name` (case-insensitive).
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub mod reqwest_transport {
    use super::*;

    use std::time::Duration as StdDuration;

    /// A real HTTP transport backed by reqwest.
    #[derive(Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }

        /// Build a transport whose requests fail with [`HttpError::Timeout`]
        /// once `timeout` elapses.
        pub fn with_timeout(timeout: StdDuration) -> Result<Self, HttpError> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| HttpError::Transport(e.to_string()))?;
            Ok(Self { client })
        }
    }

    fn classify(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::Connect(err.to_string())
        } else {
            HttpError::Transport(err.to_string())
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut builder = self.client.get(&request.url);
            for (k, v) in request.headers {
                builder = builder.header(&k, &v);
            }

            let resp = builder.send().await.map_err(classify)?;

            let status = resp.status().as_u16();
            let mut headers: HttpHeaders = Vec::new();
            for (name, value) in resp.headers().iter() {
                headers.push((
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                ));
            }

            let body = resp.bytes().await.map_err(classify)?.to_vec();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
use std::collections::{HashMap, VecDeque};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// In-memory mock transport.
///
/// Responses (or errors) are queued per URL and handed out in FIFO order.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[cfg(test)]
#[derive(Default)]
struct MockTransportInner {
    routes: HashMap<String, VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Vec<HttpRequest>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, url: impl Into<String>, response: HttpResponse) {
        self.push(url, Ok(response));
    }

    pub fn push_error(&self, url: impl Into<String>, error: HttpError) {
        self.push(url, Err(error));
    }

    /// Queue a JSON body with the given status.
    pub fn push_json(&self, url: impl Into<String>, status: u16, body: &serde_json::Value) {
        self.push_response(
            url,
            HttpResponse {
                status,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: serde_json::to_vec(body).expect("json body should serialize"),
            },
        );
    }

    fn push(&self, url: impl Into<String>, result: Result<HttpResponse, HttpError>) {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");
        inner.routes.entry(url.into()).or_default().push_back(result);
    }

    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        let inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");
        inner.requests.clone()
    }

    #[must_use]
    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| r.url == url).count()
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");

        let url = request.url.clone();
        inner.requests.push(request);

        match inner.routes.get_mut(&url).and_then(|q| q.pop_front()) {
            Some(result) => result,
            None => Err(HttpError::NoMockResponse { url }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn header_get_is_case_insensitive_and_returns_first_match() {
        let headers: HttpHeaders = vec![
            ("Link".to_string(), "<a>; rel=\"next\"".to_string()),
            ("link".to_string(), "<b>; rel=\"next\"".to_string()),
        ];
        assert_eq!(header_get(&headers, "link"), Some("<a>; rel=\"next\""));
        assert_eq!(header_get(&headers, "LINK"), Some("<a>; rel=\"next\""));
        assert_eq!(header_get(&headers, "missing"), None);
    }

    #[test]
    fn only_connect_and_timeout_errors_are_transient() {
        assert!(HttpError::Connect("refused".into()).is_transient());
        assert!(HttpError::Timeout("slow".into()).is_transient());
        assert!(!HttpError::Transport("bad url".into()).is_transient());
        assert!(!HttpError::NoMockResponse { url: "x".into() }.is_transient());
    }

    #[test]
    fn http_response_success_range() {
        let mut resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(resp.is_success());
        resp.status = 204;
        assert!(resp.is_success());
        resp.status = 304;
        assert!(!resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn mock_transport_returns_queued_results_in_order_and_records_requests() {
        let transport = MockTransport::new();
        let url = "https://example.com/api";

        transport.push_error(url, HttpError::Timeout("slow".into()));
        transport.push_response(
            url,
            HttpResponse {
                status: 200,
                headers: vec![("X-Test".to_string(), "ok".to_string())],
                body: b"hello".to_vec(),
            },
        );

        let req = HttpRequest::get(url).with_header("Accept", "application/json");
        let err = transport.send(req.clone()).await.expect_err("first is error");
        assert!(matches!(err, HttpError::Timeout(_)));

        let resp = transport.send(req.clone()).await.expect("mock response");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("x-test"), Some("ok"));
        assert_eq!(resp.body, b"hello".to_vec());

        assert_eq!(transport.requests(), vec![req.clone(), req]);
        assert_eq!(transport.request_count(url), 2);
    }

    #[tokio::test]
    async fn mock_transport_errors_when_no_response_is_registered() {
        let transport = MockTransport::new();
        let err = transport
            .send(HttpRequest::get("https://example.com/missing"))
            .await
            .expect_err("missing mock should error");
        match err {
            HttpError::NoMockResponse { url } => {
                assert_eq!(url, "https://example.com/missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reqwest_transport_with_timeout_builds_client() {
        let transport = reqwest_transport::ReqwestTransport::with_timeout(Duration::from_millis(1))
            .expect("reqwest transport should build");
        let _ = transport;
    }

    #[tokio::test]
    async fn reqwest_transport_send_makes_request_and_reads_response() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            stream
                .set_read_timeout(Some(Duration::from_secs(2)))
                .expect("set_read_timeout");

            let mut buf = Vec::new();
            let mut tmp = [0u8; 4096];
            loop {
                match stream.read(&mut tmp) {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.extend_from_slice(&tmp[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(e)
                        if e.kind() == std::io::ErrorKind::WouldBlock
                            || e.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        break;
                    }
                    Err(e) => panic!("read request: {e}"),
                }
            }

            let req_text = String::from_utf8_lossy(&buf);
            assert!(
                req_text.starts_with("GET /search "),
                "unexpected request line: {req_text:?}"
            );
            assert!(
                req_text.to_lowercase().contains("x-test: 1"),
                "expected x-test header"
            );

            let body = b"{\"items\":[]}";
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nLink: <http://next>; rel=\"next\"\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write headers");
            stream.write_all(body).expect("write body");
            stream.flush().ok();
        });

        let transport = reqwest_transport::ReqwestTransport::new(reqwest::Client::new());
        let req = HttpRequest::get(format!("http://{addr}/search")).with_header("X-Test", "1");

        let resp = transport.send(req).await.expect("transport should succeed");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("link"), Some("<http://next>; rel=\"next\""));
        assert_eq!(resp.body, b"{\"items\":[]}".to_vec());

        handle.join().expect("server thread");
    }

    #[tokio::test]
    async fn reqwest_transport_classifies_refused_connection_as_connect() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("local addr")
        };

        let transport = reqwest_transport::ReqwestTransport::new(reqwest::Client::new());
        let err = transport
            .send(HttpRequest::get(format!("http://{addr}/closed")))
            .await
            .expect_err("closed port should fail");
        assert!(matches!(err, HttpError::Connect(_)), "got {err:?}");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn reqwest_transport_classifies_slow_server_as_timeout() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");

        // Accept and hold the connection without answering.
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            std::thread::sleep(Duration::from_millis(500));
            drop(stream);
        });

        let transport =
            reqwest_transport::ReqwestTransport::with_timeout(Duration::from_millis(100))
                .expect("transport");
        let err = transport
            .send(HttpRequest::get(format!("http://{addr}/slow")))
            .await
            .expect_err("slow server should time out");
        assert!(matches!(err, HttpError::Timeout(_)), "got {err:?}");

        handle.join().expect("server thread");
    }

    #[tokio::test]
    async fn reqwest_transport_send_returns_transport_error_for_invalid_url() {
        let transport = reqwest_transport::ReqwestTransport::new(reqwest::Client::new());
        let err = transport
            .send(HttpRequest::get("not a url"))
            .await
            .expect_err("expected error");
        assert!(matches!(err, HttpError::Transport(_)));
    }
}
