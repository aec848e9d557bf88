// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical forms for record names and values.
//!
//! Desired values from a task and current values from a provider both pass
//! through [`normalize_value`] before they are compared, so that values which
//! only differ in surface formatting compare equal:
//!
//! - TXT/SPF: wrapping quotes are removed and multiple character-strings are
//!   joined; escape sequences are kept byte for byte.
//! - Multi-field types (MX, SRV, CAA, PTR, ...): whitespace runs outside of
//!   quotes collapse to a single space. Field order is significant and kept.
//! - CNAME/NS: trimmed and lowercased.
//! - Everything else (A, AAAA, ...): trimmed only. IPv6 case is never touched.
//!
//! Every normalization is idempotent.

use super::RecordType;
use crate::constants::TXT_CHARACTER_STRING_MAX_LEN;
use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::str::Chars;

/// How a provider stores TXT content on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxtEncoding {
    /// One or more quoted character-strings (`"part1" "part2"`)
    Quoted,
    /// Raw text without quotes
    Unquoted,
}

/// Normalize a fully-qualified record or zone name.
///
/// Lowercases, trims whitespace and drops one trailing dot.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

/// Canonicalize a single record value for `record_type`.
#[must_use]
pub fn normalize_value(record_type: RecordType, raw: &str) -> String {
    if record_type.is_text() {
        normalize_text(raw)
    } else if record_type.is_multi_field() {
        collapse_whitespace(raw)
    } else if record_type.is_host_name() {
        raw.trim().to_ascii_lowercase()
    } else {
        raw.trim().to_string()
    }
}

/// Canonicalize every value of a record set.
#[must_use]
pub fn normalize_values(record_type: RecordType, values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| normalize_value(record_type, v))
        .collect()
}

/// Canonicalize a value read from a provider that stores TXT as `encoding`.
///
/// Non-text values go through [`normalize_value`] unchanged.
#[must_use]
pub fn decode_value(record_type: RecordType, wire: &str, encoding: TxtEncoding) -> String {
    if record_type.is_text() {
        decode_txt(wire, encoding)
    } else {
        normalize_value(record_type, wire)
    }
}

/// Convert canonical TXT content into a provider's wire form.
#[must_use]
pub fn encode_txt(content: &str, encoding: TxtEncoding) -> String {
    match encoding {
        TxtEncoding::Unquoted => unescape_quotes(content),
        TxtEncoding::Quoted => split_character_strings(content)
            .iter()
            .map(|chunk| format!("\"{chunk}\""))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Convert a provider's wire form of TXT content back into canonical content.
///
/// Unquoted wire text is taken literally, so a leading quote is escaped
/// rather than parsed as a character-string.
#[must_use]
pub fn decode_txt(wire: &str, encoding: TxtEncoding) -> String {
    match encoding {
        TxtEncoding::Quoted => normalize_text(wire),
        TxtEncoding::Unquoted => escape_bare_quotes(wire),
    }
}

fn normalize_text(raw: &str) -> String {
    if raw.trim_start().starts_with('"') {
        // Malformed quoting is left for the provider to reject.
        decode_character_strings(raw.trim()).unwrap_or_else(|| raw.to_string())
    } else {
        escape_bare_quotes(raw)
    }
}

/// Parse `"a" "b"` into `ab`. Returns `None` if the quoting is malformed.
fn decode_character_strings(raw: &str) -> Option<String> {
    let mut chars = raw.chars().peekable();
    let mut content = String::new();

    loop {
        if chars.next() != Some('"') {
            return None;
        }
        loop {
            match chars.next()? {
                '\\' => {
                    content.push('\\');
                    content.push(chars.next()?);
                }
                '"' => break,
                c => content.push(c),
            }
        }
        skip_whitespace(&mut chars);
        if chars.peek().is_none() {
            return Some(content);
        }
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn escape_bare_quotes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of `escape_bare_quotes` for canonical content: `\"` becomes a
/// literal quote, every other escape pair is kept.
fn unescape_quotes(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some(escaped) => {
                out.push('\\');
                out.push(escaped);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.trim().chars();
    let mut in_quotes = false;
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        if !in_quotes && c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match c {
            '\\' if in_quotes => {
                out.push('\\');
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                out.push('"');
            }
            c => out.push(c),
        }
    }
    out
}

/// Split canonical TXT content into character-strings of bounded length.
///
/// Escape sequences (`\"`, `\\`, `\DDD`) are never split across two strings.
fn split_character_strings(content: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        let mut unit = String::from(c);
        if c == '\\' {
            if chars.peek().is_some_and(char::is_ascii_digit) {
                for _ in 0..3 {
                    match chars.next_if(char::is_ascii_digit) {
                        Some(d) => unit.push(d),
                        None => break,
                    }
                }
            } else if let Some(escaped) = chars.next() {
                unit.push(escaped);
            }
        }
        if current.len() + unit.len() > TXT_CHARACTER_STRING_MAX_LEN {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(&unit);
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod normalize_tests;
