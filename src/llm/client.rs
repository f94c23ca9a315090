use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_analysis_prompt, AnalysisError};
use crate::models::AnalysisResult;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Configuration for the chat-completions client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key (from GROQ_API_KEY env var)
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Model to use (e.g., "llama-3.3-70b-versatile")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Language the report text should be written in
    pub language: String,
}

impl LlmConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, AnalysisError> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AnalysisError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("RELATE_API_BASE") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("RELATE_MODEL") {
            config.model = model;
        }
        Ok(config)
    }

    /// Create with default settings
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 2048,
            connect_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(120),
            language: "English".to_string(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Token usage reported by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Client for the relationship analysis call
pub struct AnalysisClient {
    client: Client,
    config: LlmConfig,
}

impl AnalysisClient {
    pub fn new(config: LlmConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send the formatted chat excerpt and decode the structured result
    pub async fn analyze(
        &self,
        formatted_chat: &str,
    ) -> Result<(AnalysisResult, Usage), AnalysisError> {
        let prompt = build_analysis_prompt(formatted_chat, &self.config.language);
        let (text, usage) = self.send_message(&prompt).await?;
        let result = parse_analysis_text(&text)?;
        Ok((result, usage))
    }

    /// Send a single user message and return the text of the first choice
    pub async fn send_message(&self, user: &str) -> Result<(String, Usage), AnalysisError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            temperature: Some(self.config.temperature),
            max_tokens: self.config.max_tokens,
        };

        debug!(
            "POST {} (model {}, {} prompt chars)",
            self.config.completions_url(),
            self.config.model,
            user.len()
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api { status, body });
        }

        let body = response.text().await?;
        extract_content(&body)
    }
}

/// Pull the first choice's text out of a chat-completions response body
pub fn extract_content(body: &str) -> Result<(String, Usage), AnalysisError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
        .ok_or(AnalysisError::EmptyResponse)?;

    Ok((text, response.usage.unwrap_or_default()))
}

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.+?)\s*```").expect("invalid fence pattern")
});

/// Strip a Markdown code fence around the JSON, if the model added one
pub fn strip_code_fence(text: &str) -> &str {
    JSON_FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| text.trim())
}

/// Decode the model's reply into an analysis result
pub fn parse_analysis_text(text: &str) -> Result<AnalysisResult, AnalysisError> {
    Ok(serde_json::from_str(strip_code_fence(text))?)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
