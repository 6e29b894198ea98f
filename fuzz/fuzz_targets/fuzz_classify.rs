//! Fuzz testing for the text pipeline
//!
//! Segmentation, rule classification and concept extraction must accept any
//! UTF-8 input without panicking, and concept spans must slice the input.
//!
//! Run with: cargo +nightly fuzz run fuzz_classify

#![no_main]

use libfuzzer_sys::fuzz_target;
use voice_scribe_lib::concepts::extract_snomed_candidates;
use voice_scribe_lib::rule_classifier::classify_rule_based;
use voice_scribe_lib::segmenter::segment_transcript;

fuzz_target!(|text: &str| {
    for sentence in segment_transcript(text) {
        assert!(!sentence.is_empty());
        assert_eq!(sentence, sentence.trim());

        let result = classify_rule_based(&sentence);
        assert_eq!(result.text, sentence);
    }

    for concept in extract_snomed_candidates(text) {
        assert!(concept.start <= concept.end);
        assert_eq!(text.get(concept.start..concept.end), Some(concept.match_text.as_str()));
    }
});
