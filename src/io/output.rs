use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};

use crate::models::{AnalysisRecord, AnalysisResult};

/// Write an analysis result as pretty JSON
pub fn write_json(result: &AnalysisResult, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, result).context("Failed to write JSON")?;
    Ok(())
}

/// Human-readable relationship report
pub struct HumanReport<'a> {
    result: &'a AnalysisResult,
}

impl<'a> HumanReport<'a> {
    pub fn new(result: &'a AnalysisResult) -> Self {
        Self { result }
    }

    /// Format the report as plain text
    pub fn format(&self) -> String {
        let r = self.result;
        let mut output = String::new();

        output.push_str("Relationship Report\n");
        output.push_str("===================\n\n");

        output.push_str(&format!(
            "Health score: {}/100 ({})\n\n",
            r.health_score,
            r.score_band().label()
        ));

        if !r.summary.is_empty() {
            output.push_str(&wrap_text(&r.summary, 80));
            output.push_str("\n\n");
        }

        if !r.communication_style.is_empty() {
            output.push_str(&format!("Communication style: {}\n", r.communication_style));
        }

        let balance = &r.message_balance;
        if !balance.person_a.is_empty() || !balance.person_b.is_empty() {
            output.push_str(&format!(
                "Message balance: {} {}% / {} {}%\n",
                balance.person_a,
                balance.person_a_percentage,
                balance.person_b,
                balance.person_b_percentage
            ));
        }

        if !r.dominant_emotions.is_empty() {
            output.push_str(&format!(
                "Dominant emotions: {}\n",
                r.dominant_emotions.join(", ")
            ));
        }
        output.push('\n');

        push_section(&mut output, "Positive aspects", &r.positive_aspects, false);

        if r.red_flags.is_empty() {
            output.push_str("Red flags\n---------\nNone detected.\n\n");
        } else {
            push_section(&mut output, "Red flags", &r.red_flags, false);
        }

        push_section(&mut output, "Action plan", &r.action_plan, true);

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

fn push_section(output: &mut String, title: &str, items: &[String], numbered: bool) {
    if items.is_empty() {
        return;
    }

    output.push_str(title);
    output.push('\n');
    output.push_str(&"-".repeat(title.chars().count()));
    output.push('\n');
    for (i, item) in items.iter().enumerate() {
        if numbered {
            output.push_str(&format!("{}. {}\n", i + 1, item));
        } else {
            output.push_str(&format!("- {}\n", item));
        }
    }
    output.push('\n');
}

/// One line of the history listing
pub fn format_record_line(record: &AnalysisRecord) -> String {
    format!(
        "#{:<4} {}  {:>3}/100  {} & {}",
        record.id,
        format_created_at(record.created_at_ms),
        record.health_score,
        display_name(&record.person_a),
        display_name(&record.person_b)
    )
}

/// Format Unix milliseconds as local "YYYY-MM-DD HH:MM"
fn format_created_at(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "????-??-?? ??:??".to_string(),
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "?" } else { name }
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len + word_len + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word_len;
    }

    result
}
