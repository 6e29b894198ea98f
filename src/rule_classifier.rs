//! Rule-based utterance classifier.
//!
//! Decision order is fixed: advice is checked first, complaint second, and
//! anything else is `other`. Negation is computed independently of the class.

use crate::lexicon::{
    clean_token, contains_any_phrase, is_negation_cue, ADVICE_CUES, ADVICE_PHRASES,
    COMPLAINT_TOKENS, FIRST_PERSON_CUES, IMPERATIVE_VERBS, NEGATION_WINDOW,
};
use crate::normalize::normalize;
use crate::signals;
use crate::utterance::{ClassifiedUtterance, UtteranceClass};

/// Classify one raw utterance. Never fails; always yields one of the three classes.
pub fn classify_rule_based(raw: &str) -> ClassifiedUtterance {
    let normalized = normalize(raw);
    let mut result = ClassifiedUtterance::new(raw, rule_class(&normalized));
    result.negated = detect_negation(&normalized);
    result
}

/// Class decision on already-normalized text
pub fn rule_class(normalized: &str) -> UtteranceClass {
    if is_advice(normalized) {
        UtteranceClass::Advice
    } else if is_complaint(normalized) {
        UtteranceClass::Complaint
    } else {
        UtteranceClass::Other
    }
}

fn is_advice(normalized: &str) -> bool {
    starts_with_action_verb(normalized)
        || contains_any_phrase(normalized, ADVICE_CUES)
        || contains_any_phrase(normalized, ADVICE_PHRASES)
        || signals::has_dosage(normalized)
        || signals::has_duration(normalized)
}

fn is_complaint(normalized: &str) -> bool {
    contains_any_phrase(normalized, FIRST_PERSON_CUES)
        || contains_any_phrase(normalized, COMPLAINT_TOKENS)
}

fn starts_with_action_verb(normalized: &str) -> bool {
    let mut tokens = normalized.split(' ').map(clean_token);
    let first = match tokens.next() {
        Some("please") => tokens.next(),
        other => other,
    };
    first.is_some_and(|verb| IMPERATIVE_VERBS.contains(&verb))
}

/// True when a negation cue is followed, within [`NEGATION_WINDOW`] tokens,
/// by a symptom term.
pub fn detect_negation(normalized: &str) -> bool {
    let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();

    tokens.iter().enumerate().any(|(i, token)| {
        if !is_negation_cue(token) {
            return false;
        }
        let window = tokens
            .iter()
            .skip(i + 1)
            .take(NEGATION_WINDOW)
            .map(|t| clean_token(t))
            .collect::<Vec<_>>()
            .join(" ");
        contains_any_phrase(&window, COMPLAINT_TOKENS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negated_complaint() {
        let result = classify_rule_based("No fever, no cough today");
        assert_eq!(result.class, UtteranceClass::Complaint);
        assert!(result.negated);
        assert!(result.confidence.is_none());
        assert!(result.concepts.is_empty());
    }

    #[test]
    fn test_plain_complaint_not_negated() {
        let result = classify_rule_based("Patient reports cough and fever");
        assert_eq!(result.class, UtteranceClass::Complaint);
        assert!(!result.negated);
    }

    #[test]
    fn test_advice_precedence() {
        let result = classify_rule_based("Take paracetamol 500mg twice daily for 3 days");
        assert_eq!(result.class, UtteranceClass::Advice);
    }

    #[test]
    fn test_advice_beats_complaint_tokens() {
        // Mentions a symptom but is phrased as an instruction
        let result = classify_rule_based("Please take steam inhalation for the cold");
        assert_eq!(result.class, UtteranceClass::Advice);
    }

    #[test]
    fn test_first_person_cue() {
        assert_eq!(classify_rule_based("I feel dizzy in the mornings").class, UtteranceClass::Complaint);
        assert_eq!(classify_rule_based("It started since Monday").class, UtteranceClass::Complaint);
    }

    #[test]
    fn test_hinglish_complaint() {
        assert_eq!(classify_rule_based("Mujhe bukhar hai").class, UtteranceClass::Complaint);
        let negated = classify_rule_based("khansi nahi hai, sar dard nahi");
        assert_eq!(negated.class, UtteranceClass::Complaint);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify_rule_based("Blood pressure is 130 over 80").class, UtteranceClass::Other);
        assert_eq!(classify_rule_based("How are you feeling today?").class, UtteranceClass::Other);
        assert_eq!(classify_rule_based("").class, UtteranceClass::Other);
    }

    #[test]
    fn test_imperative_verbs() {
        assert_eq!(classify_rule_based("Drink plenty of water").class, UtteranceClass::Advice);
        assert_eq!(classify_rule_based("Please rest at home").class, UtteranceClass::Advice);
        assert_eq!(classify_rule_based("Avoid oily food.").class, UtteranceClass::Advice);
        assert_eq!(classify_rule_based("You should walk daily").class, UtteranceClass::Advice);
    }

    #[test]
    fn test_text_is_kept_raw() {
        let raw = "  Severe HEADACHE since Monday ";
        assert_eq!(classify_rule_based(raw).text, raw);
    }

    #[test]
    fn test_negation_window_is_five_tokens() {
        assert!(detect_negation("no history of any recent fever"));
        assert!(!detect_negation("no history of any recent travel or fever"));
    }

    #[test]
    fn test_negation_multiword_symptom() {
        assert!(detect_negation("denies chest pain or shortness of breath"));
    }

    #[test]
    fn test_negation_without_symptom() {
        assert!(!detect_negation("no known allergies"));
        assert_eq!(classify_rule_based("No known allergies").class, UtteranceClass::Other);
    }
}
