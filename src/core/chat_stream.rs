use std::error::Error as StdError;
use std::fmt;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{BlogListing, ChatResult, FramePayload, GenerateRequest};
use crate::core::frame_parser::{Frame, FrameParser, FrameResult};
use crate::core::reconcile::Reconciler;
use crate::utils::url::construct_api_url;

/// Receives reconciled text as it arrives. Every call carries a non-empty
/// increment that directly follows the previous one.
pub trait DeltaSink {
    fn on_delta(&mut self, text: &str);
}

impl<F: FnMut(&str)> DeltaSink for F {
    fn on_delta(&mut self, text: &str) {
        self(text)
    }
}

#[derive(Debug)]
pub enum TransportError {
    Request(reqwest::Error),
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    /// The body stream failed after the response headers were accepted.
    Body(Box<dyn StdError + Send + Sync>),
    /// A whole-body response arrived but was not the expected JSON.
    Decode(serde_json::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(source) => {
                write!(f, "Request to blog service failed: {source}")
            }
            TransportError::Status { status, body } => {
                write!(
                    f,
                    "Blog service returned {status}: {}",
                    summarize_error_body(body)
                )
            }
            TransportError::Body(source) => write!(f, "Response stream interrupted: {source}"),
            TransportError::Decode(source) => {
                write!(f, "Blog service sent an unreadable response: {source}")
            }
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Request(source) => Some(source),
            TransportError::Status { .. } => None,
            TransportError::Body(source) => Some(&**source),
            TransportError::Decode(source) => Some(source),
        }
    }
}

/// Why a chat session produced no [`ChatResult`].
#[derive(Debug)]
pub enum SessionError {
    Transport(TransportError),
    Cancelled,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport(err) => write!(f, "{err}"),
            SessionError::Cancelled => write!(f, "Request cancelled"),
        }
    }
}

impl StdError for SessionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SessionError::Transport(err) => Some(err),
            SessionError::Cancelled => None,
        }
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        SessionError::Transport(err)
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .get("detail")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
        .filter(|summary| !summary.is_empty())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Cross-read state for one chat request: the pending line tail, the
/// reconciliation state, and the terminal result once one has been seen.
#[derive(Debug, Default)]
struct ReconciliationSession {
    parser: FrameParser,
    reconciler: Reconciler,
    terminal: Option<ChatResult>,
}

impl ReconciliationSession {
    fn push<S: DeltaSink + ?Sized>(&mut self, bytes: &[u8], sink: &mut S) {
        for frame in self.parser.push(bytes) {
            self.handle_frame(frame, sink);
        }
    }

    fn handle_frame<S: DeltaSink + ?Sized>(&mut self, frame: FrameResult, sink: &mut S) {
        if self.reconciler.is_terminated() {
            debug!("Ignoring frame received after stream termination");
            return;
        }

        match frame {
            Ok(Frame::Payload(payload)) => self.handle_payload(payload, sink),
            Ok(Frame::Done) => {
                debug!("Received [DONE] sentinel");
                self.reconciler.terminate();
            }
            Err(err) => {
                warn!(error = %err, line = %err.line(), "Skipping malformed stream frame");
            }
        }
    }

    fn handle_payload<S: DeltaSink + ?Sized>(&mut self, payload: FramePayload, sink: &mut S) {
        if let Some(delta) = self.reconciler.apply(payload.chunk_text()) {
            sink.on_delta(delta);
        }

        if payload.is_terminal() {
            debug!(
                success = ?payload.success,
                has_data = payload.data.is_some(),
                "Received terminal frame"
            );
            self.reconciler.terminate();
            self.terminal = ChatResult::from_terminal(payload);
        }
    }

    fn is_terminated(&self) -> bool {
        self.reconciler.is_terminated()
    }

    fn finish<S: DeltaSink + ?Sized>(mut self, sink: &mut S) -> ChatResult {
        if let Some(frame) = self.parser.finish() {
            self.handle_frame(frame, sink);
        }
        self.reconciler.terminate();

        let accumulated = self.reconciler.into_accumulated_text();
        match self.terminal {
            Some(mut result) => {
                if result.message.is_empty() {
                    result.message = accumulated;
                }
                result
            }
            None => ChatResult::from_accumulated(accumulated),
        }
    }
}

/// Runs one reconciliation session over a body stream.
///
/// Deltas are pushed into `sink` as frames complete. A read error ends the
/// session with [`SessionError::Transport`]; cancellation drops whatever is
/// buffered and returns [`SessionError::Cancelled`]. In neither case is a
/// partial result produced.
pub async fn drive_stream<St, B, E, S>(
    stream: St,
    cancel_token: &CancellationToken,
    sink: &mut S,
) -> Result<ChatResult, SessionError>
where
    St: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: StdError + Send + Sync + 'static,
    S: DeltaSink + ?Sized,
{
    let mut stream = std::pin::pin!(stream);
    let mut session = ReconciliationSession::default();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                debug!(
                    pending_bytes = session.parser.pending_len(),
                    "Stream cancelled; discarding buffered state"
                );
                return Err(SessionError::Cancelled);
            }
            next = stream.next() => next,
        };

        match next {
            Some(Ok(bytes)) => {
                session.push(bytes.as_ref(), sink);
                if session.is_terminated() {
                    break;
                }
            }
            Some(Err(err)) => {
                return Err(TransportError::Body(Box::new(err)).into());
            }
            None => break,
        }
    }

    Ok(session.finish(sink))
}

#[derive(Clone, Debug)]
pub struct BlogService {
    client: reqwest::Client,
    base_url: String,
}

impl BlogService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `request` and streams the reconciled answer into `sink`.
    pub async fn chat_stream<S: DeltaSink + ?Sized>(
        &self,
        request: &GenerateRequest,
        cancel_token: &CancellationToken,
        sink: &mut S,
    ) -> Result<ChatResult, SessionError> {
        let response = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => return Err(SessionError::Cancelled),
            response = self.send_generate(request) => response?,
        };

        drive_stream(response.bytes_stream(), cancel_token, sink).await
    }

    /// Sends `request` and reads the whole answer as one JSON object. Missing
    /// fields are tolerated; a bare `chunk` stands in for an absent `message`.
    pub async fn chat(&self, request: &GenerateRequest) -> Result<ChatResult, SessionError> {
        let response = self.send_generate(request).await?;
        let body = response.text().await.map_err(TransportError::Request)?;
        let mut payload: FramePayload =
            serde_json::from_str(&body).map_err(TransportError::Decode)?;
        if payload.message.as_deref().map_or(true, str::is_empty) {
            payload.message = payload.chunk.take();
        }
        Ok(ChatResult::from_payload(payload))
    }

    pub async fn list_blogs(&self) -> Result<BlogListing, TransportError> {
        let url = construct_api_url(&self.base_url, "list-blogs");
        debug!(url = %url, "Fetching generated blog list");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TransportError::Request)?;
        let response = ensure_success(response).await?;
        let body = response.text().await.map_err(TransportError::Request)?;
        serde_json::from_str(&body).map_err(TransportError::Decode)
    }

    async fn send_generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<reqwest::Response, TransportError> {
        let url = construct_api_url(&self.base_url, "generate");
        debug!(
            url = %url,
            topic = %request.topic,
            randomness = request.randomness,
            "Sending generate request"
        );

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(TransportError::Request)?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    Err(TransportError::Status { status, body })
}

#[derive(Clone, Debug, PartialEq)]
pub enum StreamMessage {
    Chunk(String),
    Complete(ChatResult),
    Error(String),
    End,
}

pub struct StreamParams {
    pub service: BlogService,
    pub request: GenerateRequest,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

/// Runs chat sessions on the tokio runtime and reports their progress over
/// a channel. Every message carries the `stream_id` of its session so that
/// a consumer can drop events from a superseded request.
#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) -> tokio::task::JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                service,
                request,
                cancel_token,
                stream_id,
            } = params;

            let mut forward = |delta: &str| {
                let _ = tx.send((StreamMessage::Chunk(delta.to_string()), stream_id));
            };

            match service
                .chat_stream(&request, &cancel_token, &mut forward)
                .await
            {
                Ok(result) => {
                    let _ = tx.send((StreamMessage::Complete(result), stream_id));
                    let _ = tx.send((StreamMessage::End, stream_id));
                }
                Err(SessionError::Cancelled) => {
                    debug!(stream_id, "Chat stream cancelled");
                }
                Err(err) => {
                    let _ = tx.send((StreamMessage::Error(err.to_string()), stream_id));
                    let _ = tx.send((StreamMessage::End, stream_id));
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde_json::json;
    use std::io;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    type Read = Result<Vec<u8>, io::Error>;

    fn reads(chunks: &[&str]) -> Vec<Read> {
        chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect()
    }

    async fn run(items: Vec<Read>) -> (Result<ChatResult, SessionError>, Vec<String>) {
        let mut deltas = Vec::new();
        let mut sink = |delta: &str| deltas.push(delta.to_string());
        let result = drive_stream(stream::iter(items), &CancellationToken::new(), &mut sink).await;
        (result, deltas)
    }

    #[tokio::test]
    async fn overlapping_frames_are_delivered_as_clean_deltas() {
        let (result, deltas) = run(reads(&[
            "data: {\"chunk\":\"Hello wor\"}\n",
            "data: {\"chunk\":\"world, this",
            " is new\"}\ndata: {\"chunk\":\"world, this is new\"}\n",
        ]))
        .await;

        let result = result.expect("session should succeed");
        assert_eq!(deltas, vec!["Hello wor", "ld, this is new"]);
        assert_eq!(result.message, "Hello world, this is new");
        assert!(result.success);
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn terminal_message_wins_over_accumulated_text() {
        let (result, deltas) = run(reads(&[
            "data: {\"chunk\":\"draft text\"}\n",
            "data: {\"message\":\"Final blog post\",\"success\":true,\"data\":{\"topic\":\"rust\"}}\n",
        ]))
        .await;

        let result = result.expect("session should succeed");
        assert_eq!(deltas, vec!["draft text"]);
        assert_eq!(result.message, "Final blog post");
        assert_eq!(result.data, Some(json!({ "topic": "rust" })));
    }

    #[tokio::test]
    async fn terminal_failure_fields_are_carried_through() {
        let (result, _) = run(reads(&[
            "data: {\"message\":\"\",\"success\":false,\"error\":\"rate limited\"}\n",
        ]))
        .await;

        let result = result.expect("session should succeed");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("rate limited"));
    }

    #[tokio::test]
    async fn malformed_line_does_not_interrupt_accumulation() {
        let (result, deltas) = run(reads(&[
            "data: {\"chunk\":\"before \"}\ndata: {\"chunk\": oops}\n",
            "data: {\"chunk\":\"after\"}\n",
        ]))
        .await;

        assert_eq!(deltas, vec!["before ", "after"]);
        assert_eq!(result.expect("session").message, "before after");
    }

    #[tokio::test]
    async fn empty_stream_yields_successful_empty_result() {
        let (result, deltas) = run(Vec::new()).await;

        let result = result.expect("session should succeed");
        assert!(deltas.is_empty());
        assert_eq!(result.message, "");
        assert!(result.success);
    }

    #[tokio::test]
    async fn transport_failure_mid_stream_yields_no_result() {
        let mut items = reads(&["data: {\"chunk\":\"partial\"}\n"]);
        items.push(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset",
        )));
        items.extend(reads(&["data: {\"chunk\":\"never seen\"}\n"]));

        let (result, deltas) = run(items).await;

        assert_eq!(deltas, vec!["partial"]);
        match result {
            Err(SessionError::Transport(TransportError::Body(source))) => {
                assert!(source.to_string().contains("connection reset"));
            }
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn cancelled_session_never_reaches_the_sink() {
        let token = CancellationToken::new();
        token.cancel();
        let mut calls = 0;
        let mut sink = |_: &str| calls += 1;

        let result = drive_stream(
            stream::iter(reads(&["data: {\"chunk\":\"ignored\"}\n"])),
            &token,
            &mut sink,
        )
        .await;

        assert!(matches!(result, Err(SessionError::Cancelled)));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn empty_terminal_message_keeps_streamed_text() {
        let (result, deltas) = run(reads(&[
            "data: {\"chunk\":\"abc\"}\n",
            "data: {\"message\":\"\",\"success\":true,\"data\":{\"id\":7}}\n",
        ]))
        .await;

        let result = result.expect("session should succeed");
        assert_eq!(deltas, vec!["abc"]);
        assert_eq!(result.message, "abc");
        assert!(result.success);
    }

    #[tokio::test]
    async fn failed_terminal_without_message_falls_back_to_streamed_text() {
        let (result, deltas) = run(reads(&[
            "data: {\"chunk\":\"partial draft\"}\n",
            "data: {\"message\":\"\",\"success\":false,\"error\":\"timeout\"}\n",
            "data: {\"chunk\":\"late\"}\n",
        ]))
        .await;

        let result = result.expect("session should succeed");
        assert_eq!(deltas, vec!["partial draft"]);
        assert_eq!(result.message, "partial draft");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn cancellation_mid_stream_discards_the_buffered_line() {
        let token = CancellationToken::new();
        let mut deltas = Vec::new();
        let mut sink = |delta: &str| {
            deltas.push(delta.to_string());
            token.cancel();
        };

        let body = stream::iter(reads(&[
            "data: {\"chunk\":\"one\"}\ndata: {\"chunk\":\"two\"}",
        ]))
        .chain(stream::pending());

        let result = drive_stream(body, &token, &mut sink).await;

        assert!(matches!(result, Err(SessionError::Cancelled)));
        assert_eq!(deltas, vec!["one"]);
    }

    #[tokio::test]
    async fn frames_after_terminal_frame_are_dropped() {
        let (result, deltas) = run(reads(&[
            "data: {\"chunk\":\"one\",\"message\":\"one\"}\ndata: {\"chunk\":\"two\"}\n",
            "data: {\"chunk\":\"three\"}\n",
        ]))
        .await;

        assert_eq!(deltas, vec!["one"]);
        assert_eq!(result.expect("session").message, "one");
    }

    #[tokio::test]
    async fn done_sentinel_ends_the_session() {
        let (result, deltas) = run(reads(&[
            "data: {\"chunk\":\"text\"}\ndata: [DONE]\ndata: {\"chunk\":\"late\"}\n",
        ]))
        .await;

        assert_eq!(deltas, vec!["text"]);
        assert_eq!(result.expect("session").message, "text");
    }

    #[tokio::test]
    async fn unterminated_final_line_is_still_reconciled() {
        let (result, deltas) = run(reads(&[
            "data: {\"chunk\":\"abc\"}\n",
            "data: {\"chunk\":\"bcdef\"}",
        ]))
        .await;

        assert_eq!(deltas, vec!["abc", "def"]);
        assert_eq!(result.expect("session").message, "abcdef");
    }

    #[test]
    fn status_error_summarises_json_detail() {
        let err = TransportError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: r#"{"detail":"Blog generation   failed: boom"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Blog service returned 500 Internal Server Error: Blog generation failed: boom"
        );
    }

    #[test]
    fn status_error_falls_back_to_raw_body() {
        assert_eq!(summarize_error_body("  upstream down "), "upstream down");
        assert_eq!(summarize_error_body(""), "<empty body>");
        assert_eq!(
            summarize_error_body(r#"{"error":{"message":"overloaded"}}"#),
            "overloaded"
        );
    }

    #[tokio::test]
    async fn chat_stream_posts_request_and_reconciles_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_json(json!({
                "message": "write about rust",
                "topic": "write about rust",
                "randomness": 0.8
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "data: {\"chunk\":\"Rust is\"}\n\ndata: {\"chunk\":\"is fast\"}\n",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let service = BlogService::new(reqwest::Client::new(), format!("{}/", server.uri()));
        let mut text = String::new();
        let mut sink = |delta: &str| text.push_str(delta);

        let result = service
            .chat_stream(
                &GenerateRequest::from_message("write about rust"),
                &CancellationToken::new(),
                &mut sink,
            )
            .await
            .expect("chat should succeed");

        assert_eq!(result.message, "Rust is fast");
        assert_eq!(text, "Rust is fast");
    }

    #[tokio::test]
    async fn chat_stream_surfaces_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "detail": "Blog generation failed" })),
            )
            .mount(&server)
            .await;

        let service = BlogService::new(reqwest::Client::new(), server.uri());
        let mut sink = |_: &str| panic!("no delta expected");

        let err = service
            .chat_stream(
                &GenerateRequest::from_message("x"),
                &CancellationToken::new(),
                &mut sink,
            )
            .await
            .expect_err("status should fail the session");

        match err {
            SessionError::Transport(TransportError::Status { status, .. }) => {
                assert_eq!(status.as_u16(), 500);
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn buffered_chat_reads_whole_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "A full post",
                "success": true,
                "data": { "words": 3 }
            })))
            .mount(&server)
            .await;

        let service = BlogService::new(reqwest::Client::new(), server.uri());
        let result = service
            .chat(&GenerateRequest::from_message("post").with_randomness(0.2))
            .await
            .expect("chat should succeed");

        assert_eq!(result.message, "A full post");
        assert_eq!(result.data, Some(json!({ "words": 3 })));
    }

    #[tokio::test]
    async fn buffered_chat_tolerates_missing_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chunk": "Only text" })))
            .mount(&server)
            .await;

        let service = BlogService::new(reqwest::Client::new(), server.uri());
        let result = service
            .chat(&GenerateRequest::from_message("post"))
            .await
            .expect("chat should succeed");

        assert_eq!(result.message, "Only text");
        assert!(result.success);
    }

    #[tokio::test]
    async fn buffered_chat_reports_unreadable_body_as_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let service = BlogService::new(reqwest::Client::new(), server.uri());
        let err = service
            .chat(&GenerateRequest::from_message("post"))
            .await
            .expect_err("html body should not decode");

        assert!(matches!(
            err,
            SessionError::Transport(TransportError::Decode(_))
        ));
        assert!(err.to_string().starts_with("Blog service sent an unreadable response"));
    }

    #[tokio::test]
    async fn list_blogs_reads_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list-blogs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "blogs": [{ "topic": "rust" }, { "topic": "tokio" }],
                "count": 2
            })))
            .mount(&server)
            .await;

        let service = BlogService::new(reqwest::Client::new(), server.uri());
        let listing = service.list_blogs().await.expect("listing");

        assert_eq!(listing.count, 2);
        assert_eq!(listing.blogs[1]["topic"], "tokio");
    }

    #[tokio::test]
    async fn stream_service_reports_chunks_then_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("data: {\"chunk\":\"ab\"}\ndata: {\"chunk\":\"bcd\"}\n"),
            )
            .mount(&server)
            .await;

        let (stream_service, mut rx) = ChatStreamService::new();
        let handle = stream_service.spawn_stream(StreamParams {
            service: BlogService::new(reqwest::Client::new(), server.uri()),
            request: GenerateRequest::from_message("go"),
            cancel_token: CancellationToken::new(),
            stream_id: 7,
        });
        handle.await.expect("stream task");

        let mut messages = Vec::new();
        while let Ok((message, stream_id)) = rx.try_recv() {
            assert_eq!(stream_id, 7);
            messages.push(message);
        }

        assert_eq!(
            messages,
            vec![
                StreamMessage::Chunk("ab".to_string()),
                StreamMessage::Chunk("cd".to_string()),
                StreamMessage::Complete(ChatResult::from_accumulated("abcd".to_string())),
                StreamMessage::End,
            ]
        );
    }

    #[tokio::test]
    async fn stream_service_stays_silent_when_cancelled() {
        let (stream_service, mut rx) = ChatStreamService::new();
        let token = CancellationToken::new();
        token.cancel();

        let handle = stream_service.spawn_stream(StreamParams {
            service: BlogService::new(reqwest::Client::new(), "http://127.0.0.1:9"),
            request: GenerateRequest::from_message("go"),
            cancel_token: token,
            stream_id: 1,
        });
        handle.await.expect("stream task");

        assert!(rx.try_recv().is_err());
    }
}
