//! Utterance normalization.
//!
//! Lowercases, folds curly quotes to straight quotes, collapses whitespace runs
//! and trims. The stored utterance text is never touched; callers work on the
//! normalized view and map spans back through [`NormalizedText::raw_span`].

/// A normalized string plus the byte mapping back into the raw input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    /// For each byte of `text`: start byte of the raw char that produced it
    starts: Vec<usize>,
    /// For each byte of `text`: end byte of the raw char that produced it
    ends: Vec<usize>,
}

impl NormalizedText {
    /// Map a byte span of the normalized text to the raw text it came from.
    ///
    /// Returns `None` for empty or out-of-range spans.
    pub fn raw_span(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if start >= end {
            return None;
        }
        let raw_start = *self.starts.get(start)?;
        let raw_end = *self.ends.get(end - 1)?;
        Some((raw_start, raw_end))
    }
}

/// Normalize an utterance for matching. Total: empty in, empty out.
pub fn normalize(s: &str) -> String {
    normalize_with_offsets(s).text
}

/// Normalize and keep the offset map needed to report raw spans.
pub fn normalize_with_offsets(raw: &str) -> NormalizedText {
    let mut out = NormalizedText {
        text: String::with_capacity(raw.len()),
        starts: Vec::with_capacity(raw.len()),
        ends: Vec::with_capacity(raw.len()),
    };
    let mut pending_space: Option<(usize, usize)> = None;

    for (idx, ch) in raw.char_indices() {
        let end = idx + ch.len_utf8();

        if ch.is_whitespace() {
            if !out.text.is_empty() && pending_space.is_none() {
                pending_space = Some((idx, end));
            }
            continue;
        }

        if let Some((space_start, space_end)) = pending_space.take() {
            push_char(&mut out, ' ', space_start, space_end);
        }

        match fold_quote(ch) {
            Some(straight) => push_char(&mut out, straight, idx, end),
            None => {
                for lower in ch.to_lowercase() {
                    push_char(&mut out, lower, idx, end);
                }
            }
        }
    }

    out
}

fn fold_quote(ch: char) -> Option<char> {
    match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => Some('\''),
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => Some('"'),
        _ => None,
    }
}

fn push_char(out: &mut NormalizedText, ch: char, raw_start: usize, raw_end: usize) {
    out.text.push(ch);
    for _ in 0..ch.len_utf8() {
        out.starts.push(raw_start);
        out.ends.push(raw_end);
    }
}
