//! Argument-payload grammar shared by tools.
//!
//! Two shapes are in use: a single positional string (usually quoted) and a
//! comma/whitespace-separated list of `key="value"` / `key=value` pairs.
//! Inside quoted values `\"` and `\\` are the only recognized escapes. A
//! bare value ends at whitespace or at a comma that introduces the next
//! `key=` pair, so bracketed values like `view_range=[1,10]` survive
//! unquoted. Decoding the payload stays the tool's own responsibility; the
//! dispatcher hands it over verbatim.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("expected a parameter name at offset {0}")]
    ExpectedKey(usize),
    #[error("missing '=' after parameter name '{0}'")]
    MissingEquals(String),
    #[error("unterminated quoted value for parameter '{0}'")]
    UnterminatedQuote(String),
}

/// Interprets the payload as a single positional argument, stripping one
/// layer of matching surrounding quotes.
pub fn positional(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Tokenizes a `key="value"` / `key=value` list. Duplicate keys keep the
/// last assignment.
pub fn parse_named(raw: &str) -> Result<BTreeMap<String, String>, ArgumentError> {
    let bytes = raw.as_bytes();
    let mut params = BTreeMap::new();
    let mut i = 0usize;

    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b',') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let key_start = i;
        while i < bytes.len() && is_identifier(bytes[i]) {
            i += 1;
        }
        if i == key_start {
            return Err(ArgumentError::ExpectedKey(key_start));
        }
        let key = &raw[key_start..i];

        if i >= bytes.len() || bytes[i] != b'=' {
            return Err(ArgumentError::MissingEquals(key.to_string()));
        }
        i += 1;

        let value = if i < bytes.len() && bytes[i] == b'"' {
            i += 1;
            let (value, next) = quoted_value(raw, i)
                .ok_or_else(|| ArgumentError::UnterminatedQuote(key.to_string()))?;
            i = next;
            value
        } else {
            let value_start = i;
            while i < bytes.len() {
                let byte = bytes[i];
                if byte.is_ascii_whitespace() {
                    break;
                }
                if byte == b',' && delimits_next_pair(&bytes[i + 1..]) {
                    break;
                }
                i += 1;
            }
            raw[value_start..i].to_string()
        };

        params.insert(key.to_string(), value);
    }

    Ok(params)
}

fn is_identifier(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Reads a quoted value starting just past the opening quote. Returns the
/// unescaped value and the offset past the closing quote, or `None` when
/// the quote never closes.
fn quoted_value(raw: &str, start: usize) -> Option<(String, usize)> {
    let bytes = raw.as_bytes();
    let mut value = String::new();
    let mut segment_start = start;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && (bytes[i + 1] == b'"' || bytes[i + 1] == b'\\') => {
                value.push_str(&raw[segment_start..i]);
                value.push(bytes[i + 1] as char);
                i += 2;
                segment_start = i;
            }
            b'"' => {
                value.push_str(&raw[segment_start..i]);
                return Some((value, i + 1));
            }
            _ => i += 1,
        }
    }

    None
}

// A comma ends a bare value only when the rest of the input starts another
// `key=` pair or nothing at all.
fn delimits_next_pair(rest: &[u8]) -> bool {
    let mut i = 0;
    while i < rest.len() && (rest[i].is_ascii_whitespace() || rest[i] == b',') {
        i += 1;
    }
    if i >= rest.len() {
        return true;
    }
    let key_start = i;
    while i < rest.len() && is_identifier(rest[i]) {
        i += 1;
    }
    i > key_start && i < rest.len() && rest[i] == b'='
}
