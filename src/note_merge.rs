//! Merge submitted review results into the owning clinical note.
//!
//! Complaints become new chief-complaint rows. Advice becomes bullet lines in
//! the free-text follow-up field, de-duplicated against what is already there.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::review_session::SubmitPayload;

const BULLET: &str = "• ";

/// Strip a leading bullet marker and surrounding whitespace from one line
pub fn strip_bullet(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| c == '•' || c == '-' || c.is_whitespace())
        .trim_end()
}

/// Merge advice lines into existing bullet text.
///
/// Existing lines are de-bulleted and kept in order, repeats included. New
/// lines are appended only if not already present (exact match after
/// stripping). Every line is re-rendered as "• text".
pub fn merge_bullets(existing: &str, additions: &[String]) -> String {
    let mut lines: Vec<&str> = existing
        .lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .collect();

    for line in additions.iter().flat_map(|a| a.lines()).map(strip_bullet) {
        if !line.is_empty() && !lines.contains(&line) {
            lines.push(line);
        }
    }

    lines
        .iter()
        .map(|line| format!("{BULLET}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One chief-complaint row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRow {
    pub symptom: String,
    pub since: String,
    pub severity: String,
}

impl ComplaintRow {
    pub fn new(symptom: impl Into<String>) -> Self {
        Self {
            symptom: symptom.into(),
            ..Default::default()
        }
    }
}

/// Append one row per complaint. No de-duplication against existing rows.
pub fn append_complaint_rows(rows: &mut Vec<ComplaintRow>, complaints: &[String]) -> usize {
    let before = rows.len();
    rows.extend(
        complaints
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(ComplaintRow::new),
    );
    rows.len() - before
}

/// The note fields touched by a review submit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFields {
    pub chief_complaint_rows: Vec<ComplaintRow>,
    pub follow_up_text: String,
}

/// What a submit changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    pub rows_added: usize,
    pub advice_lines: usize,
}

impl NoteFields {
    /// Apply a submit payload; the follow-up text is only rewritten when
    /// there is advice to merge.
    pub fn apply_submission(&mut self, payload: &SubmitPayload) -> MergeSummary {
        let rows_added = append_complaint_rows(&mut self.chief_complaint_rows, &payload.complaints);
        if !payload.advice.is_empty() {
            self.follow_up_text = merge_bullets(&self.follow_up_text, &payload.advice);
        }
        let advice_lines = self.follow_up_text.lines().count();
        debug!("Merged submission: {} rows added, {} advice lines", rows_added, advice_lines);
        MergeSummary {
            rows_added,
            advice_lines,
        }
    }
}
