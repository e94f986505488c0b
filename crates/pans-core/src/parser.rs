//! Decoder for the pan tool's list output.
//!
//! The tool prints two lines per process. Only the first line of each stanza
//! carries data:
//!
//! ```text
//! #3 'firefox'
//! <informational line>
//! ```
//!
//! Some builds of the tool print the id token with a stray `b"` in front of the
//! `#`; that prefix is stripped before the token is checked.

use crate::error::ParseError;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

pub type ProcessId = u32;

const STANZA_LINES: usize = 2;
const BYTE_MARKER: &str = "b\"";
const ID_MARKER: char = '#';
const NAME_OPENER: &str = " '";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub id: ProcessId,
    pub name: String,
}

/// Parses the full list output into records in emission order.
///
/// A trailing incomplete stanza (the empty fragment after the final newline)
/// is dropped. The first grammar violation fails the whole parse.
pub fn parse_process_list(raw: &str) -> Result<Vec<ProcessRecord>, ParseError> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(lines.len() / STANZA_LINES);
    for (stanza, chunk) in lines.chunks_exact(STANZA_LINES).enumerate() {
        let line = stanza * STANZA_LINES + 1;
        let record = parse_record_line(chunk[0], line)?;
        if !seen.insert(record.id) {
            return Err(ParseError::DuplicateId {
                line,
                id: record.id,
            });
        }
        records.push(record);
    }
    debug!(records = records.len(), "parsed process list");
    Ok(records)
}

fn parse_record_line(text: &str, line: usize) -> Result<ProcessRecord, ParseError> {
    let token = text.split(' ').next().unwrap_or_default();
    let token = token.strip_prefix(BYTE_MARKER).unwrap_or(token);
    let Some(digits) = token.strip_prefix(ID_MARKER) else {
        return Err(ParseError::MissingIdMarker {
            line,
            token: token.to_string(),
        });
    };
    let id = digits.parse::<ProcessId>().map_err(|_| ParseError::InvalidId {
        line,
        token: token.to_string(),
    })?;

    let Some((_, quoted)) = text.split_once(NAME_OPENER) else {
        return Err(ParseError::MissingName {
            line,
            text: text.to_string(),
        });
    };
    // closing quote
    let mut chars = quoted.chars();
    chars.next_back();

    Ok(ProcessRecord {
        id,
        name: chars.as_str().to_string(),
    })
}
