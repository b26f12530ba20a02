// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Entry parser — turns pasted multi-line text into ordered `(code, label)`
// entries.
//
// Blank lines are dropped up front. The remaining lines are walked once, left
// to right, with one line of lookahead:
//
//   1. a line of 8 or 13 digits is a bare code;
//   2. otherwise, if the next line is such a code, the current line is its
//      label and both lines are consumed;
//   3. otherwise the line is discarded.
//
// A discarded line is never re-examined, so "label, label, code" pairs the
// second label with the code and drops the first.

use tracing::debug;

use crate::error::{LabelsheetError, Result};
use crate::types::{Entry, is_ean_code};

/// A non-blank input line that produced no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedLine {
    /// 1-based line number in the original input, blank lines included.
    pub line_no: usize,
    /// Trimmed line text.
    pub text: String,
}

/// Everything the parser learned from one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub entries: Vec<Entry>,
    pub discarded: Vec<DiscardedLine>,
}

impl ParseOutcome {
    /// Fail with `NoValidEntries` when nothing usable was found.
    pub fn into_entries(self) -> Result<Vec<Entry>> {
        if self.entries.is_empty() {
            return Err(LabelsheetError::NoValidEntries);
        }
        Ok(self.entries)
    }
}

/// Parse raw text into entries, reporting discarded lines.
///
/// Never fails; callers decide whether an empty result is an error (see
/// [`ParseOutcome::into_entries`] and [`parse_entries`]).
pub fn parse(raw: &str) -> ParseOutcome {
    let lines: Vec<(usize, &str)> = split_lines(raw)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let mut outcome = ParseOutcome::default();
    let mut i = 0;

    while i < lines.len() {
        let (line_no, current) = lines[i];

        if let Some(entry) = Entry::new(current, "") {
            outcome.entries.push(entry);
            i += 1;
            continue;
        }

        if let Some(&(_, next)) = lines.get(i + 1) {
            if is_ean_code(next) {
                if let Some(entry) = Entry::new(next, current) {
                    outcome.entries.push(entry);
                }
                i += 2;
                continue;
            }
        }

        debug!(line_no, text = current, "discarding line with no code");
        outcome.discarded.push(DiscardedLine {
            line_no,
            text: current.to_string(),
        });
        i += 1;
    }

    outcome
}

/// Split on every Unicode line boundary: `\n`, `\r`, `\r\n`, vertical tab,
/// form feed, the file/group/record separators, NEL, U+2028 and U+2029.
/// `\r\n` counts as one boundary.
fn split_lines(raw: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = raw.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&raw[start..idx]);
        start = idx + c.len_utf8();
        if c == '\r' {
            if let Some(&(next_idx, '\n')) = chars.peek() {
                chars.next();
                start = next_idx + 1;
            }
        }
    }
    if start < raw.len() {
        lines.push(&raw[start..]);
    }
    lines
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Parse raw text into entries, failing with `NoValidEntries` when none were
/// found.
pub fn parse_entries(raw: &str) -> Result<Vec<Entry>> {
    parse(raw).into_entries()
}
