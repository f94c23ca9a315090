use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::MessageBalance;

/// One utterance extracted from an exported chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Raw timestamp token as written in the export (dialect-specific)
    pub timestamp: String,
    /// Display name of the sender, trimmed
    pub sender: String,
    /// Message body; continuation lines are joined with '\n'
    pub content: String,
}

impl Message {
    pub fn new(
        timestamp: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            sender: sender.into(),
            content: content.into(),
        }
    }

    /// Append a continuation line to the body
    pub(crate) fn push_line(&mut self, line: &str) {
        self.content.push('\n');
        self.content.push_str(line);
    }

    /// Number of whitespace-delimited words in the body.
    ///
    /// Runs of spaces, tabs and continuation-line breaks all count as one
    /// separator, so `"a  b\nc"` is three words, not a count of single-space
    /// splits.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Summary view over a parsed message sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParserStats {
    pub total_messages: usize,
    /// Senders in order of first appearance
    pub unique_senders: Vec<String>,
    pub message_count_by_sender: HashMap<String, usize>,
    pub words_by_sender: HashMap<String, usize>,
    pub total_words: usize,
}

impl ParserStats {
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut stats = Self {
            total_messages: messages.len(),
            ..Default::default()
        };

        for message in messages {
            let words = message.word_count();
            stats.total_words += words;

            if !stats.message_count_by_sender.contains_key(&message.sender) {
                stats.unique_senders.push(message.sender.clone());
            }
            *stats
                .message_count_by_sender
                .entry(message.sender.clone())
                .or_insert(0) += 1;
            *stats
                .words_by_sender
                .entry(message.sender.clone())
                .or_insert(0) += words;
        }

        stats
    }

    /// Message count for a sender (0 if unknown)
    pub fn messages_from(&self, sender: &str) -> usize {
        self.message_count_by_sender.get(sender).copied().unwrap_or(0)
    }

    /// Senders ordered by message count, most active first.
    /// Ties keep first-appearance order.
    pub fn senders_by_activity(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .unique_senders
            .iter()
            .map(|s| (s.as_str(), self.messages_from(s)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Local message balance between the two most active senders.
    ///
    /// Percentages are relative to the two-person total and always sum to 100.
    /// Returns `None` when fewer than two senders are present.
    pub fn balance(&self) -> Option<MessageBalance> {
        let ranked = self.senders_by_activity();
        let (&(person_a, count_a), &(person_b, count_b)) = (ranked.first()?, ranked.get(1)?);

        let pair_total = count_a + count_b;
        let person_a_percentage = ((count_a * 100) as f64 / pair_total as f64).round() as i32;

        Some(MessageBalance {
            person_a: person_a.to_string(),
            person_b: person_b.to_string(),
            person_a_percentage,
            person_b_percentage: 100 - person_a_percentage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Message> {
        vec![
            Message::new("1.1.2024 10:00", "Alice", "Hello there"),
            Message::new("1.1.2024 10:01", "Bob", "Hi"),
            Message::new("1.1.2024 10:02", "Alice", "How are you\ndoing today"),
            Message::new("1.1.2024 10:03", "Alice", "?"),
        ]
    }

    #[test]
    fn test_stats_counts() {
        let stats = ParserStats::from_messages(&sample());

        assert_eq!(stats.total_messages, 4);
        assert_eq!(stats.unique_senders, vec!["Alice", "Bob"]);
        assert_eq!(stats.messages_from("Alice"), 3);
        assert_eq!(stats.messages_from("Bob"), 1);
        assert_eq!(stats.messages_from("Carol"), 0);
        assert_eq!(stats.total_words, 2 + 1 + 5 + 1);
        assert_eq!(stats.words_by_sender["Alice"], 8);
    }

    #[test]
    fn test_stats_empty() {
        let stats = ParserStats::from_messages(&[]);
        assert_eq!(stats.total_messages, 0);
        assert!(stats.unique_senders.is_empty());
        assert_eq!(stats.total_words, 0);
        assert!(stats.balance().is_none());
    }

    #[test]
    fn test_balance_two_senders() {
        let balance = ParserStats::from_messages(&sample()).balance().unwrap();

        assert_eq!(balance.person_a, "Alice");
        assert_eq!(balance.person_b, "Bob");
        assert_eq!(balance.person_a_percentage, 75);
        assert_eq!(balance.person_b_percentage, 25);
    }

    #[test]
    fn test_balance_sums_to_hundred() {
        let messages = vec![
            Message::new("t1", "A", "x"),
            Message::new("t2", "B", "x"),
            Message::new("t3", "B", "x"),
        ];
        let balance = ParserStats::from_messages(&messages).balance().unwrap();

        assert_eq!(balance.person_a, "B");
        assert_eq!(balance.person_a_percentage + balance.person_b_percentage, 100);
    }

    #[test]
    fn test_word_count_collapses_whitespace() {
        let mut message = Message::new("1.1.2024 10:00", "Alice", "see  you\tsoon");
        message.push_line("  then  dinner ");

        assert_eq!(message.word_count(), 5);
        assert_eq!(ParserStats::from_messages(&[message]).total_words, 5);
    }

    #[test]
    fn test_push_line() {
        let mut message = Message::new("t", "Alice", "Hello");
        message.push_line("world");
        assert_eq!(message.content, "Hello\nworld");
    }
}
