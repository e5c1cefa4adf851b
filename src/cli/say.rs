//! One-shot "say" command: send a prompt and print the answer.

use std::error::Error;
use std::io::{self, Write};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{ChatResult, GenerateRequest};
use crate::core::chat_stream::{
    BlogService, ChatStreamService, SessionError, StreamMessage, StreamParams,
};
use crate::core::config::data::Config;
use crate::utils::logging::LoggingState;

pub struct SayOptions {
    pub prompt: Vec<String>,
    pub topic: Option<String>,
    pub randomness: Option<f64>,
    pub no_stream: bool,
    pub url: Option<String>,
    pub log: Option<String>,
}

pub async fn run_say(options: SayOptions) -> Result<(), Box<dyn Error>> {
    let prompt = options.prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: blogchat say <prompt>");
        std::process::exit(1);
    }

    let config = Config::load()?;
    let logging = LoggingState::new(options.log.or_else(|| config.log_file.clone()))?;

    let mut request = GenerateRequest::from_message(prompt.clone())
        .with_randomness(options.randomness.unwrap_or_else(|| config.randomness_or_default()));
    if let Some(topic) = options.topic {
        request = request.with_topic(topic);
    }

    let service = BlogService::new(
        reqwest::Client::new(),
        config.resolve_base_url(options.url.as_deref()),
    );
    let stream = config.stream_enabled() && !options.no_stream;
    debug!(
        base_url = service.base_url(),
        stream,
        transcript = %logging.get_status_string(),
        "Starting chat request"
    );

    let cancel_token = CancellationToken::new();
    let ctrl_c_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let outcome = if stream {
        stream_to_stdout(service, request, cancel_token).await?
    } else {
        tokio::select! {
            _ = cancel_token.cancelled() => Err(SessionError::Cancelled.to_string()),
            result = service.chat(&request) => match result {
                Ok(result) => {
                    println!("{}", result.message);
                    Ok(result)
                }
                Err(err) => Err(err.to_string()),
            },
        }
    };

    match outcome {
        Ok(result) => {
            if let Err(err) = logging.log_exchange(&prompt, &result) {
                eprintln!("⚠️  Failed to write transcript: {err}");
            }
            if !result.success {
                eprintln!(
                    "❌ Error: {}",
                    result.error.as_deref().unwrap_or("generation failed")
                );
                std::process::exit(1);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("\n❌ Error: {err}");
            std::process::exit(1);
        }
    }
}

/// Prints deltas as they arrive. Returns the session's result, or the error
/// text reported by the stream.
async fn stream_to_stdout(
    service: BlogService,
    request: GenerateRequest,
    cancel_token: CancellationToken,
) -> Result<Result<ChatResult, String>, io::Error> {
    let (stream_service, mut rx) = ChatStreamService::new();
    stream_service.spawn_stream(StreamParams {
        service,
        request,
        cancel_token: cancel_token.clone(),
        stream_id: 1,
    });
    // The spawned task owns the remaining sender; the channel closes with it.
    drop(stream_service);

    let mut streamed = String::new();
    let mut outcome = Err(SessionError::Cancelled.to_string());
    let mut stdout = io::stdout();

    while let Some((message, _)) = rx.recv().await {
        match message {
            StreamMessage::Chunk(content) => {
                write!(stdout, "{content}")?;
                stdout.flush()?;
                streamed.push_str(&content);
            }
            StreamMessage::Complete(result) => outcome = Ok(result),
            StreamMessage::Error(err) => outcome = Err(err),
            StreamMessage::End => break,
        }
    }

    if let Ok(result) = &outcome {
        if !result.message.is_empty() && result.message != streamed {
            // The terminal frame's message is authoritative.
            if !streamed.is_empty() {
                writeln!(stdout, "\n")?;
            }
            write!(stdout, "{}", result.message)?;
        }
    }
    if !streamed.is_empty() || outcome.as_ref().is_ok_and(|r| !r.message.is_empty()) {
        writeln!(stdout)?;
    }
    Ok(outcome)
}
