use thiserror::Error;
use tracing::{info, warn};

use crate::formatter::{format_for_prompt, SamplingConfig};
use crate::llm::{validate_result, AnalysisClient, AnalysisError, Usage};
use crate::models::{AnalysisResult, Message, ParserStats};
use crate::parser::parse;

/// Configuration for a full analysis run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sampling: SamplingConfig,
    /// Maximum retries when the call fails or the result fails validation
    pub max_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            max_retries: 2,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("the chat file is empty")]
    EmptyInput,

    #[error("no chat messages found; make sure the file is an exported chat transcript")]
    NoMessages,

    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

/// A transcript parsed and formatted, ready to send
#[derive(Debug, Clone)]
pub struct PreparedChat {
    pub messages: Vec<Message>,
    pub stats: ParserStats,
    /// The bounded excerpt handed to the LLM
    pub prompt: String,
}

/// Result of a full analysis run
#[derive(Debug)]
pub struct PipelineResult {
    pub prepared: PreparedChat,
    pub result: AnalysisResult,
    pub usage: Usage,
    /// Number of calls made (1 + retries used)
    pub attempts: u32,
}

/// Parse and format a raw transcript.
///
/// Blank input and input without any recognisable message are reported as
/// errors here, since there is nothing worth sending.
pub fn prepare(raw_text: &str, config: &PipelineConfig) -> Result<PreparedChat, PipelineError> {
    if raw_text.trim().is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let messages = parse(raw_text);
    if messages.is_empty() {
        return Err(PipelineError::NoMessages);
    }

    let stats = ParserStats::from_messages(&messages);
    let prompt = format_for_prompt(&messages, config.sampling.max_messages);

    info!(
        "Parsed {} messages from {} senders ({} words)",
        stats.total_messages,
        stats.unique_senders.len(),
        stats.total_words
    );
    if messages.len() > config.sampling.max_messages {
        info!(
            "Sampling at most {} of {} messages for the prompt",
            config.sampling.max_messages,
            messages.len()
        );
    }

    Ok(PreparedChat {
        messages,
        stats,
        prompt,
    })
}

/// Send a prepared chat for analysis, retrying on failure or invalid results
pub async fn analyze(
    client: &AnalysisClient,
    prepared: PreparedChat,
    config: &PipelineConfig,
) -> Result<PipelineResult, PipelineError> {
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            info!("Retry {} of {}", attempt, config.max_retries);
        }

        match client.analyze(&prepared.prompt).await {
            Ok((result, usage)) => {
                let validation = validate_result(&result);
                if validation.is_valid {
                    info!(
                        "Analysis complete: score {} ({} tokens)",
                        result.health_score, usage.total_tokens
                    );
                    return Ok(PipelineResult {
                        prepared,
                        result,
                        usage,
                        attempts: attempt + 1,
                    });
                }
                warn!("Analysis result failed validation: {:?}", validation.errors);
                last_error = Some(AnalysisError::Invalid(validation.errors));
            }
            Err(e) => {
                warn!("Analysis attempt {} failed: {}", attempt + 1, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(AnalysisError::EmptyResponse).into())
}

/// Prepare and analyze a raw transcript
pub async fn analyze_transcript(
    client: &AnalysisClient,
    raw_text: &str,
    config: &PipelineConfig,
) -> Result<PipelineResult, PipelineError> {
    let prepared = prepare(raw_text, config)?;
    analyze(client, prepared, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const CHAT: &str = "[1.1.2024 10:00] Alice: Hello\n[1.1.2024 10:01] Bob: Hi";

    const VALID_REPLY: &str = r#"{"health_score": 72, "summary": "Warm and steady.", "action_plan": ["Keep checking in"]}"#;
    const OUT_OF_RANGE_REPLY: &str = r#"{"health_score": 140, "summary": "Too good.", "action_plan": ["Nothing"]}"#;

    /// Local chat-completions endpoint answering one connection per reply, in order
    async fn serve_replies(replies: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for content in replies {
                let (mut socket, _) = listener.accept().await.unwrap();
                read_request(&mut socket).await;

                let body = serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": content}}],
                    "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
                })
                .to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        format!("http://{}", addr)
    }

    /// Read headers and a content-length body
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return;
                }
            }
        }
    }

    fn client_for(base_url: String) -> AnalysisClient {
        AnalysisClient::new(LlmConfig {
            base_url,
            ..LlmConfig::new("test-key".to_string())
        })
        .unwrap()
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.sampling.max_messages, 300);
    }

    #[test]
    fn test_prepare_empty_input() {
        let err = prepare("  \n\n", &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
    }

    #[test]
    fn test_prepare_no_messages() {
        let err = prepare("just a note\nwith no headers", &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::NoMessages));
    }

    #[test]
    fn test_prepare_formats_prompt() {
        let raw = "[1.1.2024 10:00] Alice: Hello\n[1.1.2024 10:01] Bob: Hi";
        let prepared = prepare(raw, &PipelineConfig::default()).unwrap();

        assert_eq!(prepared.messages.len(), 2);
        assert_eq!(prepared.stats.unique_senders, vec!["Alice", "Bob"]);
        assert_eq!(
            prepared.prompt,
            "[1.1.2024 10:00] Alice: Hello\n[1.1.2024 10:01] Bob: Hi\n"
        );
    }

    #[test]
    fn test_prepare_respects_sampling_budget() {
        let raw: String = (0..40)
            .map(|i| format!("[1.1.2024 10:{:02}] Alice: line {}\n", i, i))
            .collect();
        let config = PipelineConfig {
            sampling: SamplingConfig { max_messages: 8 },
            ..Default::default()
        };

        let prepared = prepare(&raw, &config).unwrap();
        assert_eq!(prepared.messages.len(), 40);
        assert!(prepared.prompt.starts_with("// Sampled 8 of 40 messages"));
    }

    #[tokio::test]
    async fn test_invalid_result_is_retried() {
        let client = client_for(serve_replies(vec![OUT_OF_RANGE_REPLY, VALID_REPLY]).await);

        let outcome = analyze_transcript(&client, CHAT, &PipelineConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.result.health_score, 72);
        assert_eq!(outcome.usage.total_tokens, 15);
        assert_eq!(outcome.prepared.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_last_error_returned_when_retries_run_out() {
        let client = client_for(serve_replies(vec![OUT_OF_RANGE_REPLY]).await);
        let config = PipelineConfig {
            max_retries: 0,
            ..Default::default()
        };

        let prepared = prepare(CHAT, &config).unwrap();
        let err = analyze(&client, prepared, &config).await.unwrap_err();

        match err {
            PipelineError::Analysis(AnalysisError::Invalid(errors)) => {
                assert!(errors.iter().any(|e| e.contains("140")));
            }
            other => panic!("expected invalid result, got {other:?}"),
        }
    }
}
