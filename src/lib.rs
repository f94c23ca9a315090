pub mod formatter;
pub mod history;
pub mod io;
pub mod llm;
pub mod models;
pub mod parser;
pub mod pipeline;

pub use formatter::{
    format_for_prompt, parse_prompt_line, sample_messages, SamplingConfig, DEFAULT_MAX_MESSAGES,
};
pub use history::{default_db_path, HistoryStore};
pub use io::{parse_transcript_file, read_transcript, write_json, HumanReport};
pub use llm::{AnalysisClient, AnalysisError, LlmConfig};
pub use models::{AnalysisRecord, AnalysisResult, Message, MessageBalance, ParserStats};
pub use parser::{parse, stats};
pub use pipeline::{PipelineConfig, PipelineError, PipelineResult, PreparedChat};
