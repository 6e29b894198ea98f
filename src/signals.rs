//! Structural instruction signals: dosage, frequency, duration, route and
//! leading imperative verbs.
//!
//! Used by the rule classifier (dosage/duration) and by the service label
//! refinement, which relabels unrecognized service output from these signals.
//! All detectors expect normalized (lowercase) text.

use std::sync::OnceLock;

use regex::Regex;
use tracing::error;

static DOSAGE: OnceLock<Option<Regex>> = OnceLock::new();
static FREQUENCY: OnceLock<Option<Regex>> = OnceLock::new();
static DURATION: OnceLock<Option<Regex>> = OnceLock::new();
static ROUTE: OnceLock<Option<Regex>> = OnceLock::new();
static IMPERATIVE: OnceLock<Option<Regex>> = OnceLock::new();

/// Compile `pattern` into `cell` once; a bad pattern is logged and yields `None`
pub(crate) fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            error!("Failed to compile pattern {:?}: {}", pattern, e);
            None
        }
    })
    .as_ref()
}

fn matches(cell: &'static OnceLock<Option<Regex>>, pattern: &str, text: &str) -> bool {
    compiled(cell, pattern).is_some_and(|re| re.is_match(text))
}

/// Numeric dose with a unit: "500mg", "2.5 ml", "1 tab"
pub fn has_dosage(text: &str) -> bool {
    matches(
        &DOSAGE,
        r"\b\d+(?:\.\d+)?\s*(?:mg|mcg|µg|g|gm|ml|iu|units?|tabs?|tablets?|caps?|capsules?|drops?|puffs?|sachets?)\b",
        text,
    )
}

/// Frequency abbreviations and spelled-out schedules
pub fn has_frequency(text: &str) -> bool {
    matches(
        &FREQUENCY,
        r"\b(?:bid|tid|qid|qds|tds|bd|od|qd|hs|prn|sos|stat)\b|\b(?:once|twice|thrice)\s+(?:a\s+day|daily|weekly)\b|\b\d+\s*times?\s+(?:a|per)\s+day\b|\bevery\s+\d+\s*(?:hours?|hrs?)\b|\b1-0-1\b|\b1-1-1\b|\b0-0-1\b|\b1-0-0\b",
        text,
    )
}

/// Course length: "for 3 days", "for two weeks", "x 5 days"
pub fn has_duration(text: &str) -> bool {
    matches(
        &DURATION,
        r"\b(?:for|x)\s+(?:\d+|a|one|two|three|four|five|six|seven|eight|nine|ten|fourteen)\s+(?:days?|weeks?|months?)\b",
        text,
    )
}

/// Route abbreviations
pub fn has_route(text: &str) -> bool {
    matches(&ROUTE, r"\b(?:po|iv|im|sc|sl|pr|inh)\b", text)
}

/// Sentence opens with an action verb, optionally after "please"
pub fn starts_with_imperative(text: &str) -> bool {
    matches(
        &IMPERATIVE,
        r"^(?:please\s+)?(?:take|start|continue|stop|avoid|drink|apply|use|wear|rest|monitor|increase|reduce|schedule|follow|come|return|check|get|do|don't|keep)\b",
        text,
    )
}

/// Any structural signal that the sentence is an instruction
pub fn has_instruction_signals(text: &str) -> bool {
    has_dosage(text)
        || has_frequency(text)
        || has_duration(text)
        || has_route(text)
        || starts_with_imperative(text)
}
