use thiserror::Error;

/// Failures at the LLM boundary
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("GROQ_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("request to analysis API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("no text content in analysis response")]
    EmptyResponse,

    #[error("analysis response is not valid result JSON: {0}")]
    MalformedResult(#[from] serde_json::Error),

    #[error("analysis result failed validation: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
