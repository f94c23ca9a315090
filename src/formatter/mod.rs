use std::collections::HashSet;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::Message;

/// Default number of messages sent to the LLM
pub const DEFAULT_MAX_MESSAGES: usize = 300;

/// Configuration for prompt sampling
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Maximum number of messages to include in the prompt
    pub max_messages: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

/// Messages selected for the prompt
#[derive(Debug, Clone)]
pub struct Sample<'a> {
    /// Selected messages in begin/middle/end order
    pub messages: Vec<&'a Message>,
    /// Size of the full conversation
    pub total: usize,
    /// Whether stratified sampling was applied
    pub sampled: bool,
}

/// Select at most `max_messages` messages.
///
/// Short conversations are returned whole. Longer ones keep a quarter from
/// the beginning, a quarter around the midpoint and the rest from the end,
/// then drop repeats of the same `(timestamp, sender)` pair. Two messages
/// from one sender within the same minute share a key, so one of them can be
/// dropped from the sample.
pub fn sample_messages(messages: &[Message], max_messages: usize) -> Sample<'_> {
    let total = messages.len();

    if total <= max_messages {
        return Sample {
            messages: messages.iter().collect(),
            total,
            sampled: false,
        };
    }

    let begin_count = max_messages / 4;
    let middle_count = max_messages / 4;
    let end_count = max_messages - begin_count - middle_count;

    let begin = &messages[..begin_count];
    let mid_start = (total / 2).saturating_sub(middle_count / 2);
    let middle = &messages[mid_start..mid_start + middle_count];
    let end = &messages[total - end_count..];

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let selected = begin
        .iter()
        .chain(middle)
        .chain(end)
        .filter(|m| seen.insert((m.timestamp.as_str(), m.sender.as_str())))
        .collect();

    Sample {
        messages: selected,
        total,
        sampled: true,
    }
}

/// Render one message as a prompt entry (without trailing newline)
pub fn render_message(message: &Message) -> String {
    format!(
        "[{}] {}: {}",
        message.timestamp, message.sender, message.content
    )
}

/// Build the bounded chat excerpt handed to the LLM.
///
/// One `[timestamp] sender: content` entry per line. When sampling kicked in
/// the excerpt starts with a `//` annotation giving both counts.
pub fn format_for_prompt(messages: &[Message], max_messages: usize) -> String {
    let sample = sample_messages(messages, max_messages);
    let mut output = String::new();

    if sample.sampled {
        let _ = writeln!(
            output,
            "// Sampled {} of {} messages (beginning, middle, end)",
            sample.messages.len(),
            sample.total
        );
    }

    for message in &sample.messages {
        output.push_str(&render_message(message));
        output.push('\n');
    }

    output
}

static PROMPT_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\[([^\]]+)\] (.+?): (.*)$").expect("invalid entry pattern"));

/// Split a rendered prompt entry back into `(timestamp, sender, content)`.
///
/// Rendering always uses the bracketed `[ts] sender: content` shape, but keeps
/// the timestamp text of whatever dialect the message was parsed from. Stamps
/// such as `12/01/2024, 10:00` or `9.04.2025 saat 09:52` are not accepted by
/// the bracketed header grammars in `parser::grammar`, so entries are split
/// here on the first `"] "` and the first `": "` after it instead.
///
/// The content may itself contain `]`, `:` or newlines.
pub fn parse_prompt_line(entry: &str) -> Option<(&str, &str, &str)> {
    let caps = PROMPT_ENTRY.captures(entry)?;
    Some((
        caps.get(1)?.as_str(),
        caps.get(2)?.as_str(),
        caps.get(3)?.as_str(),
    ))
}
