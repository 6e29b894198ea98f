//! Fuzz testing for classification service response parsing
//!
//! Run with: cargo +nightly fuzz run fuzz_service_response

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use voice_scribe_lib::service_response::{into_classified, parse_service_response};

#[derive(Debug, Arbitrary)]
struct FuzzResponse {
    body: String,
    sentences: Vec<String>,
    refine: bool,
    with_concepts: bool,
}

fuzz_target!(|input: FuzzResponse| {
    let Ok(body) = serde_json::from_str::<serde_json::Value>(&input.body) else {
        return;
    };

    if let Ok(items) = parse_service_response(&body, &input.sentences) {
        for item in items {
            assert!(!item.text.trim().is_empty());
            let _ = into_classified(item, input.refine, input.with_concepts);
        }
    }
});
