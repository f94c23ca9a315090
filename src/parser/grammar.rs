use std::sync::LazyLock;

use regex::Regex;

/// Which export dialect a header line was recognised as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    /// `[9.04.2025 09:51:54] Sender: text` (iOS)
    BracketedNoDash,
    /// `[9.04.2025, 09:51] - Sender: text`
    BracketedDash,
    /// `9.04.2025 saat 09:51 - Sender: text` (Android, Turkish locale)
    KeywordTime,
    /// `09/04/2025, 9:51 pm - Sender: text` (Android)
    Unbracketed,
}

/// Fields captured from a header line, already trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub kind: GrammarKind,
    pub timestamp: String,
    pub sender: String,
    pub body: String,
}

/// One header line shape. Group 1 = timestamp, 2 = sender, 3 = body.
#[derive(Debug)]
pub struct HeaderGrammar {
    pub kind: GrammarKind,
    pattern: Regex,
}

impl HeaderGrammar {
    fn new(kind: GrammarKind, pattern: &str) -> Self {
        Self {
            kind,
            pattern: Regex::new(pattern).expect("invalid header grammar"),
        }
    }

    /// Match the whole line. Returns `None` when the line doesn't have this
    /// shape or when the sender or body would be empty after trimming.
    pub fn try_match(&self, line: &str) -> Option<HeaderMatch> {
        let caps = self.pattern.captures(line)?;
        let timestamp = caps.get(1)?.as_str().trim();
        let sender = caps.get(2)?.as_str().trim();
        let body = caps.get(3)?.as_str().trim();

        if sender.is_empty() || body.is_empty() {
            return None;
        }

        Some(HeaderMatch {
            kind: self.kind,
            timestamp: timestamp.to_string(),
            sender: sender.to_string(),
            body: body.to_string(),
        })
    }
}

// Shared pieces. Day and month are 1-2 digits, year 2-4; time is H:MM with
// optional seconds and an optional am/pm suffix.
const DATE: &str = r"\d{1,2}[./]\d{1,2}[./]\d{2,4}";
const TIME: &str = r"\d{1,2}:\d{2}(?::\d{2})?(?:\s?[AaPp][Mm])?";
const BIDI: &str = r"[\x{200E}\x{200F}]?";
const DASH: &str = r"\s*[-\x{2013}\x{2014}]\s*";
// Sender stops at the first colon followed by whitespace.
const SENDER_BODY: &str = r"(.+?):\s(.+)";

/// Header grammars in priority order. The first full-line match wins.
pub static HEADER_GRAMMARS: LazyLock<Vec<HeaderGrammar>> = LazyLock::new(|| {
    vec![
        HeaderGrammar::new(
            GrammarKind::BracketedNoDash,
            &format!(r"^\[({DATE}\s+{TIME})\]\s+{SENDER_BODY}$"),
        ),
        HeaderGrammar::new(
            GrammarKind::BracketedDash,
            &format!(
                r"^\[{BIDI}(\d{{1,2}}[./\-]\d{{1,2}}[./\-]\d{{2,4}}[,.]?\s+{TIME})\]{DASH}{SENDER_BODY}$"
            ),
        ),
        HeaderGrammar::new(
            GrammarKind::KeywordTime,
            &format!(r"(?i)^{BIDI}({DATE}\s+(?:saat|at)\s+\d{{1,2}}:\d{{2}}){DASH}{SENDER_BODY}$"),
        ),
        HeaderGrammar::new(
            GrammarKind::Unbracketed,
            &format!(r"^{BIDI}({DATE}[,.]?\s+{TIME}){DASH}{SENDER_BODY}$"),
        ),
    ]
});

/// Try every grammar in priority order against an already-cleaned line
pub fn match_header(line: &str) -> Option<HeaderMatch> {
    HEADER_GRAMMARS.iter().find_map(|g| g.try_match(line))
}
