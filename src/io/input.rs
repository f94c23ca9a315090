use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Message;
use crate::parser::parse;

/// Read an exported chat file as text.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, since exports
/// occasionally carry stray bytes from older encodings.
pub fn read_transcript(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read and parse an exported chat file
pub fn parse_transcript_file(path: &Path) -> Result<Vec<Message>> {
    let text = read_transcript(path)?;
    Ok(parse(&text))
}
