pub mod grammar;
pub mod notices;

pub use grammar::*;
pub use notices::*;

use tracing::debug;

use crate::models::{Message, ParserStats};

/// Invisible direction marks some exporters put in front of each line
const BIDI_MARKS: &[char] = &['\u{200E}', '\u{200F}', '\u{202A}', '\u{202C}'];

const PREVIEW_LINES: usize = 5;
const PREVIEW_CHARS: usize = 120;

/// Parse an exported chat transcript into messages, in input order.
///
/// Never fails: lines that aren't headers are joined onto the message in
/// progress, or dropped if there is none. System notices (and their
/// continuation lines) are discarded. An empty result is valid.
pub fn parse(raw_text: &str) -> Vec<Message> {
    let normalized = raw_text
        .strip_prefix('\u{FEFF}')
        .unwrap_or(raw_text)
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let lines: Vec<&str> = normalized.split('\n').collect();

    debug!("Parsing {} lines", lines.len());
    for (i, line) in lines.iter().take(PREVIEW_LINES).enumerate() {
        let preview: String = line.chars().take(PREVIEW_CHARS).collect();
        debug!("Line[{}]: {:?}", i, preview);
    }

    let mut messages = Vec::new();
    let mut current: Option<Message> = None;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let cleaned = line.trim_start_matches(BIDI_MARKS);
        match match_header(cleaned) {
            Some(header) => {
                messages.extend(current.take());

                if is_system_notice(&header.body) {
                    debug!("Skipping system notice from {:?}", header.sender);
                    continue;
                }

                current = Some(Message {
                    timestamp: header.timestamp,
                    sender: header.sender,
                    content: header.body,
                });
            }
            None => {
                if let Some(message) = current.as_mut() {
                    message.push_line(line);
                }
            }
        }
    }

    messages.extend(current);

    debug!("Parsed {} messages", messages.len());
    messages
}

/// Summary statistics for a parsed transcript
pub fn stats(messages: &[Message]) -> ParserStats {
    ParserStats::from_messages(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[1.1.2024 10:00] Alice: Hello
world
[1.1.2024 10:01] Bob: Hi
[1.1.2024 10:02] Alice: How was the trip?
It rained: a lot.
[1.1.2024 10:05] Bob: Fine";

    #[test]
    fn test_continuation_joining() {
        let input = "[1.1.2024 10:00] Alice: Hello\nworld\n[1.1.2024 10:01] Bob: Hi";
        let messages = parse(input);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, "Alice");
        assert_eq!(messages[0].content, "Hello\nworld");
        assert_eq!(messages[1], Message::new("1.1.2024 10:01", "Bob", "Hi"));
    }

    #[test]
    fn test_preserves_input_order() {
        let messages = parse(SAMPLE);
        let senders: Vec<&str> = messages.iter().map(|m| m.sender.as_str()).collect();
        assert_eq!(senders, vec!["Alice", "Bob", "Alice", "Bob"]);
        assert_eq!(messages[2].content, "How was the trip?\nIt rained: a lot.");
    }

    #[test]
    fn test_system_notice_suppressed_with_continuation() {
        let input = "\
[1.1.2024 09:59] Alice: before
[1.1.2024 10:00] Alice: Messages and calls are end-to-end encrypted
No one outside of this chat can read them.
[1.1.2024 10:01] Bob: Hi";
        let messages = parse(input);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "before");
        assert_eq!(messages[1].content, "Hi");
    }

    #[test]
    fn test_notice_as_first_line() {
        let input = "12/01/2024, 10:00 - Ayşe: Mesajlar ve aramalar uçtan uca şifrelidir.\n\
                     12/01/2024, 10:02 - Ayşe: Günaydın";
        let messages = parse(input);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Günaydın");
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let spaced: String = SAMPLE
            .lines()
            .flat_map(|l| ["", l, "   ", "\t"])
            .collect::<Vec<_>>()
            .join("\n");

        assert_eq!(parse(SAMPLE), parse(&spaced));
    }

    #[test]
    fn test_blank_line_insertion_everywhere() {
        let lines: Vec<&str> = SAMPLE.lines().collect();
        let expected = parse(SAMPLE);

        for at in 0..=lines.len() {
            let mut with_blank = lines.clone();
            with_blank.insert(at, "");
            assert_eq!(parse(&with_blank.join("\n")), expected, "blank at {}", at);
        }
    }

    #[test]
    fn test_bom_and_line_endings() {
        let input = "\u{FEFF}[1.1.2024 10:00] Alice: Hello\r\nworld\r[1.1.2024 10:01] Bob: Hi\r\n";
        let messages = parse(input);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].timestamp, "1.1.2024 10:00");
        assert_eq!(messages[0].content, "Hello\nworld");
    }

    #[test]
    fn test_leading_bidi_marks_stripped() {
        let input = "\u{200E}\u{202A}[1.1.2024 10:00] Alice: Hello";
        let messages = parse(input);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, "Alice");
    }

    #[test]
    fn test_stray_lines_before_first_header_dropped() {
        let input = "Chat export\nsome preamble\n[1.1.2024 10:00] Alice: Hello";
        let messages = parse(input);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Hello");
    }

    #[test]
    fn test_mixed_dialects() {
        let input = "\
[9.04.2025 09:51:54] Süleyman: selam
9.04.2025 saat 09:52 - Zeynep: merhaba
09/04/2025, 9:53 pm - Süleyman: nasılsın
[09.04.2025, 09:54] - Zeynep: iyiyim";
        let messages = parse(input);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].timestamp, "9.04.2025 saat 09:52");
        assert_eq!(messages[2].timestamp, "09/04/2025, 9:53 pm");
        assert_eq!(messages[3].sender, "Zeynep");
    }

    #[test]
    fn test_empty_and_unparseable_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n  \n").is_empty());
        assert!(parse("no headers here\nat all").is_empty());
    }

    #[test]
    fn test_header_with_empty_body_is_continuation() {
        let input = "[1.1.2024 10:00] Alice: Hello\n[1.1.2024 10:01] Bob:   ";
        let messages = parse(input);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Hello\n[1.1.2024 10:01] Bob:   ");
    }

    #[test]
    fn test_stats_over_parsed() {
        let stats = stats(&parse(SAMPLE));
        assert_eq!(stats.total_messages, 4);
        assert_eq!(stats.unique_senders, vec!["Alice", "Bob"]);
        assert_eq!(stats.messages_from("Bob"), 2);
    }
}
