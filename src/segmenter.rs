//! Sentence segmentation for dictated transcripts.
//!
//! Two entry points:
//! - [`split_sentences`] is the raw splitter: terminal punctuation boundaries,
//!   then long clauses broken on coordinating conjunctions.
//! - [`segment_transcript`] is what the review session runs on "Analyze": explicit
//!   newlines are split first, then each line goes through the raw splitter.
//!
//! Callers that hold multi-line text and want newline boundaries respected must
//! use `segment_transcript`; `split_sentences` treats a newline like any other
//! whitespace.

use std::sync::OnceLock;

use regex::Regex;

use crate::signals::compiled;

/// Chunks longer than this (in chars) are candidates for the conjunction split
pub const DEFAULT_LONG_CLAUSE_CHARS: usize = 90;

static SENTENCE_BOUNDARY: OnceLock<Option<Regex>> = OnceLock::new();
static CONJUNCTION: OnceLock<Option<Regex>> = OnceLock::new();

/// Split a transcript on newlines, then on sentence punctuation.
pub fn segment_transcript(transcript: &str) -> Vec<String> {
    segment_transcript_with_limit(transcript, DEFAULT_LONG_CLAUSE_CHARS)
}

pub fn segment_transcript_with_limit(transcript: &str, long_clause_chars: usize) -> Vec<String> {
    transcript
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| split_sentences_with_limit(line, long_clause_chars))
        .collect()
}

/// Raw sentence splitter (no newline pre-split).
pub fn split_sentences(text: &str) -> Vec<String> {
    split_sentences_with_limit(text, DEFAULT_LONG_CLAUSE_CHARS)
}

pub fn split_sentences_with_limit(text: &str, long_clause_chars: usize) -> Vec<String> {
    split_on_terminal_punctuation(text)
        .into_iter()
        .flat_map(|chunk| {
            if chunk.chars().count() > long_clause_chars {
                split_on_conjunctions(&chunk)
            } else {
                vec![chunk]
            }
        })
        .collect()
}

/// Split on whitespace that immediately follows `.`, `!` or `?`.
fn split_on_terminal_punctuation(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let Some(boundary) = compiled(&SENTENCE_BOUNDARY, r"[.!?]\s+") else {
        push_trimmed(&mut out, text);
        return out;
    };

    let mut start = 0;
    for m in boundary.find_iter(text) {
        // Terminal marks are single-byte; keep the mark with its sentence
        push_trimmed(&mut out, &text[start..m.start() + 1]);
        start = m.end();
    }
    push_trimmed(&mut out, &text[start..]);
    out
}

/// Split on whole-word "and"/"but"/"then" (any case), dropping the conjunction.
fn split_on_conjunctions(chunk: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    match compiled(&CONJUNCTION, r"(?i)\b(?:and|but|then)\b") {
        Some(conjunction) => {
            for piece in conjunction.split(chunk) {
                push_trimmed(&mut pieces, piece);
            }
        }
        None => push_trimmed(&mut pieces, chunk),
    }
    pieces
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
