//! Clinical concept extraction against the local synonym table.
//!
//! Matching runs on the normalized text; spans are mapped back to the raw
//! utterance through the normalizer's offset map, so `start..end` always
//! slices the raw text to `match_text` even when normalization collapsed
//! whitespace before the match.

use std::collections::HashSet;

use tracing::debug;

use crate::lexicon::CONCEPT_TABLE;
use crate::normalize::normalize_with_offsets;
use crate::utterance::ConceptCandidate;

/// Scan an utterance for known concepts.
///
/// Output follows table order, not text order. Each code is emitted at most
/// once: the first synonym of an entry that occurs in the text wins.
pub fn extract_snomed_candidates(raw: &str) -> Vec<ConceptCandidate> {
    let normalized = normalize_with_offsets(raw);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates = Vec::new();

    for entry in CONCEPT_TABLE {
        if seen.contains(entry.code) {
            continue;
        }
        for synonym in entry.synonyms {
            let Some(pos) = normalized.text.find(synonym) else {
                continue;
            };
            let Some((start, end)) = normalized.raw_span(pos, pos + synonym.len()) else {
                continue;
            };
            let Some(match_text) = raw.get(start..end) else {
                continue;
            };
            candidates.push(ConceptCandidate {
                code: entry.code.to_string(),
                display: entry.display.to_string(),
                match_text: match_text.to_string(),
                start,
                end,
            });
            seen.insert(entry.code);
            break;
        }
    }

    if !candidates.is_empty() {
        debug!("Extracted {} concept candidates", candidates.len());
    }
    candidates
}
